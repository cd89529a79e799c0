use std::path::Path;

use hospitace::application::ports::{AudioLoader, AudioLoaderError};
use hospitace::infrastructure::audio::SymphoniaAudioLoader;

fn build_wav(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let num_samples = samples.len() as u32;
    let byte_rate = sample_rate * 2;
    let data_size = num_samples * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        wav.extend_from_slice(&s.to_le_bytes());
    }
    wav
}

fn write_temp_wav(sample_rate: u32, samples: &[i16]) -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
    std::fs::write(file.path(), build_wav(sample_rate, samples)).unwrap();
    file
}

#[test]
fn given_missing_path_when_loading_then_returns_not_found() {
    let loader = SymphoniaAudioLoader;

    let result = loader.load(Path::new("/definitely/not/here.mp3"));

    assert!(matches!(result, Err(AudioLoaderError::NotFound(_))));
}

#[test]
fn given_16khz_wav_when_loading_then_sample_count_is_preserved() {
    let file = write_temp_wav(16_000, &vec![0i16; 1600]);
    let loader = SymphoniaAudioLoader;

    let waveform = loader.load(file.path()).unwrap();

    assert_eq!(waveform.sample_rate(), 16_000);
    assert_eq!(waveform.len(), 1600);
}

#[test]
fn given_44100hz_wav_when_loading_then_resampled_to_16khz() {
    // 0.1s of audio at 44.1kHz should come out near 1600 samples at 16kHz
    let file = write_temp_wav(44_100, &vec![0i16; 4410]);
    let loader = SymphoniaAudioLoader;

    let waveform = loader.load(file.path()).unwrap();

    assert_eq!(waveform.sample_rate(), 16_000);
    assert!(
        waveform.len() < 4410,
        "output should have fewer samples than the 44.1kHz input"
    );
    assert!(waveform.len() > 0);
}

#[test]
fn given_garbage_bytes_when_loading_then_returns_decoding_error() {
    let file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
    std::fs::write(file.path(), vec![0xFFu8; 128]).unwrap();
    let loader = SymphoniaAudioLoader;

    let result = loader.load(file.path());

    assert!(matches!(result, Err(AudioLoaderError::DecodingFailed(_))));
}
