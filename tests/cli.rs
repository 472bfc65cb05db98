//! End-to-end runs against real WAV files.

use approx::assert_relative_eq;
use hound::{SampleFormat, WavSpec};
use sndfilter::audio_io::{read_audio_file, write_audio_file};
use sndfilter::cli::{CliApp, EXIT_FAILURE, EXIT_SUCCESS};
use sndfilter::filters::dsp::rms;
use sndfilter::{AudioData, WavBackend};
use std::f32::consts::PI;
use std::ffi::OsString;
use std::path::Path;
use tempfile::tempdir;

const RATE: u32 = 44100;

fn write_tone(path: &Path, freq: f32, amplitude: f32, channels: u16, spec: Option<WavSpec>) {
    let spec = spec.unwrap_or(WavSpec {
        channels,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    });
    let samples = (0..RATE as usize / 2)
        .flat_map(|n| {
            let s = amplitude * (2.0 * PI * freq * n as f32 / RATE as f32).sin();
            std::iter::repeat(s).take(spec.channels as usize)
        })
        .collect();
    write_audio_file(path, &AudioData::new(samples, spec)).unwrap();
}

struct Output {
    status: u8,
    stdout: String,
    stderr: String,
}

fn run_args(args: Vec<OsString>) -> Output {
    let mut app = CliApp::new(WavBackend);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let status = app.run(&args, &mut out, &mut err);
    Output {
        status,
        stdout: String::from_utf8(out).unwrap(),
        stderr: String::from_utf8(err).unwrap(),
    }
}

fn sndfilter(args: &[&str]) -> Output {
    run_args(
        std::iter::once("sndfilter")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect(),
    )
}

/// Run `sndfilter input output <filter args...>`.
fn sndfilter_on(input: &Path, output: &Path, filter_args: &[&str]) -> Output {
    let mut args = vec![
        OsString::from("sndfilter"),
        input.as_os_str().to_owned(),
        output.as_os_str().to_owned(),
    ];
    args.extend(filter_args.iter().map(OsString::from));
    run_args(args)
}

#[test]
fn lowpass_removes_high_tone() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    write_tone(&input, 10_000.0, 0.5, 1, None);

    let result = sndfilter_on(&input, &output, &["lowpass", "500", "0"]);
    assert_eq!(result.status, EXIT_SUCCESS);
    assert!(result.stdout.is_empty());
    assert!(result.stderr.is_empty());

    let before = read_audio_file(&input).unwrap();
    let after = read_audio_file(&output).unwrap();
    assert_eq!(after.spec, before.spec);
    assert_eq!(after.samples.len(), before.samples.len());
    assert!(rms(&after.samples[1000..]) < rms(&before.samples[1000..]) * 0.05);
}

#[test]
fn compressor_reduces_loud_stereo_tone() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("loud.wav");
    let output = dir.path().join("squashed.wav");
    write_tone(&input, 220.0, 0.9, 2, None);

    let result = sndfilter_on(
        &input,
        &output,
        &["compressor", "0", "-30", "0", "10", "0.001", "0.05"],
    );
    assert_eq!(result.status, EXIT_SUCCESS, "{}", result.stderr);

    let before = read_audio_file(&input).unwrap();
    let after = read_audio_file(&output).unwrap();
    assert_eq!(after.num_channels, 2);
    assert!(rms(&after.samples) < rms(&before.samples) * 0.5);

    // channels share one gain
    for frame in after.samples.chunks_exact(2) {
        assert_relative_eq!(frame[0], frame[1]);
    }
}

#[test]
fn float_input_keeps_its_format() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("float.wav");
    let output = dir.path().join("float_out.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 48000,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    write_tone(&input, 1000.0, 0.25, 1, Some(spec));

    let result = sndfilter_on(&input, &output, &["peaking", "1000", "1", "6"]);
    assert_eq!(result.status, EXIT_SUCCESS, "{}", result.stderr);
    assert_eq!(read_audio_file(&output).unwrap().spec, spec);
}

#[test]
fn twenty_four_bit_input_keeps_its_format() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("deep.wav");
    let output = dir.path().join("deep_out.wav");
    let spec = WavSpec {
        channels: 2,
        sample_rate: 48000,
        bits_per_sample: 24,
        sample_format: SampleFormat::Int,
    };
    write_tone(&input, 12_000.0, 0.5, 2, Some(spec));

    let result = sndfilter_on(&input, &output, &["lowpass", "400", "0"]);
    assert_eq!(result.status, EXIT_SUCCESS, "{}", result.stderr);

    let before = read_audio_file(&input).unwrap();
    let after = read_audio_file(&output).unwrap();
    assert_eq!(after.spec, spec);
    assert_eq!(after.samples.len(), before.samples.len());
    assert!(rms(&after.samples[2000..]) < rms(&before.samples[2000..]) * 0.05);
}

#[cfg(unix)]
#[test]
fn non_utf8_paths_round_trip() {
    use std::os::unix::ffi::OsStringExt;

    let dir = tempdir().unwrap();
    let input = dir.path().join(OsString::from_vec(b"caf\xe9.wav".to_vec()));
    let output = dir.path().join(OsString::from_vec(b"sortie-\xe9.wav".to_vec()));
    // some file systems refuse names that are not valid UTF-8
    if std::fs::File::create(&input).is_err() {
        return;
    }
    write_tone(&input, 440.0, 0.5, 1, None);

    let result = sndfilter_on(&input, &output, &["bandpass", "440", "1"]);
    assert_eq!(result.status, EXIT_SUCCESS, "{}", result.stderr);
    assert!(output.exists());
    assert!(!dir.path().join("caf\u{fffd}.wav").exists());
}

#[test]
fn missing_input_reports_path() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("nope.wav");
    let output = dir.path().join("out.wav");

    let result = sndfilter_on(&input, &output, &["notch", "60", "10"]);
    assert_eq!(result.status, EXIT_FAILURE);
    assert_eq!(
        result.stderr,
        format!("Error: Failed to load WAV: {}\n", input.display())
    );
    assert!(!output.exists());
}

#[test]
fn invalid_frequency_fails_to_apply() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    write_tone(&input, 440.0, 0.5, 1, None);

    let result = sndfilter_on(&input, &output, &["highpass", "40000", "0"]);
    assert_eq!(result.status, EXIT_FAILURE);
    assert_eq!(result.stderr, "Error: Failed to apply filter\n");
    assert!(!output.exists());
}

#[test]
fn unwritable_output_reports_path() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("missing_dir").join("out.wav");
    write_tone(&input, 440.0, 0.5, 1, None);

    let result = sndfilter_on(&input, &output, &["allpass", "1000", "0.7"]);
    assert_eq!(result.status, EXIT_FAILURE);
    assert_eq!(
        result.stderr,
        format!("Error: Failed to save WAV: {}\n", output.display())
    );
}

#[test]
fn bad_arguments_touch_no_files() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.wav");

    let input = dir.path().join("a.wav");
    let result = sndfilter_on(&input, &output, &["lowshelf", "100", "0.7"]);
    assert_eq!(result.status, EXIT_FAILURE);
    assert_eq!(result.stderr, "Error: Bad arguments for lowshelf\n");
    assert!(result.stdout.contains("Usage:"));
    assert!(!output.exists());
}

#[test]
fn no_arguments_prints_help() {
    let result = sndfilter(&[]);
    assert_eq!(result.status, EXIT_SUCCESS);
    assert!(result.stdout.contains("sndfilter input.wav output.wav <filter> <...>"));
    assert!(result.stderr.is_empty());
}
