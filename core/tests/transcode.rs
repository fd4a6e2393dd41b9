/*
 * transcode.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Integration tests for content handlers: generate/extract across encodings, progress
 * reporting, failure behaviour and round-trip properties.
 *
 * Run with:
 *   cargo test -p tagliacarte_content --test transcode
 */

use std::io::{self, Read, Write};

use proptest::prelude::*;
use tagliacarte_content::codec::EncoderRegistry;
use tagliacarte_content::{
    BufferContentHandler, ContentHandler, Encoding, MediaType, ProgressListener, TranscodeError,
};

static ENCODINGS: [Encoding; 6] = [
    Encoding::Base64,
    Encoding::QuotedPrintable,
    Encoding::UuEncode,
    Encoding::SevenBit,
    Encoding::EightBit,
    Encoding::Binary,
];

/// Records every progress callback.
#[derive(Default)]
struct RecordingProgress {
    started: Option<u64>,
    updates: Vec<(u64, u64)>,
    stopped: Option<u64>,
}

impl ProgressListener for RecordingProgress {
    fn start(&mut self, predicted_total: u64) {
        self.started = Some(predicted_total);
    }
    fn progress(&mut self, current: u64, current_total: u64) {
        self.updates.push((current, current_total));
    }
    fn stop(&mut self, total: u64) {
        self.stopped = Some(total);
    }
}

impl RecordingProgress {
    fn assert_monotonic_to(&self, total: u64) {
        assert_eq!(self.started, Some(total));
        assert!(!self.updates.is_empty());
        assert!(self.updates.windows(2).all(|w| w[0].0 <= w[1].0), "{:?}", self.updates);
        assert!(self.updates.iter().all(|&(_, t)| t == total));
        assert_eq!(self.updates.last().map(|u| u.0), Some(total));
        assert_eq!(self.stopped, Some(total));
    }
}

/// Sink that accepts `limit` bytes, then fails.
struct FailingSink {
    written: Vec<u8>,
    limit: usize,
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.len() >= self.limit {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        let n = buf.len().min(self.limit - self.written.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reader that yields some bytes, then fails.
struct FailingReader {
    remaining: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "source lost"));
        }
        let n = buf.len().min(self.remaining);
        buf[..n].fill(b'x');
        self.remaining -= n;
        Ok(n)
    }
}

fn encode(data: &[u8], encoding: &Encoding) -> Vec<u8> {
    let mut out = Vec::new();
    BufferContentHandler::from_raw(data.to_vec())
        .generate(&mut out, encoding, 76)
        .unwrap();
    out
}

#[test]
fn hello_world_example() {
    let h = BufferContentHandler::from("Hello, World!");
    let mut sink = Vec::new();
    h.generate(&mut sink, &Encoding::Base64, 76).unwrap();
    assert_eq!(sink, b"SGVsbG8sIFdvcmxkIQ==");
    let mut sink2 = Vec::new();
    h.extract(&mut sink2, None).unwrap();
    assert_eq!(sink2, b"Hello, World!");
}

#[test]
fn quoted_printable_to_base64_matches_decoded_original() {
    let qp = b"Gr=C3=BC=C3=9Fe aus K=C3=B6ln,=\r\n bis bald=21\r\nZeile zwei";
    let mut h = BufferContentHandler::new(&qp[..], Encoding::QuotedPrintable);
    h.set_content_type_hint(MediaType::new("text", "plain"));

    let mut b64 = Vec::new();
    h.generate(&mut b64, &Encoding::Base64, 76).unwrap();
    let decoded_b64 = {
        let mut out = Vec::new();
        BufferContentHandler::new(b64, Encoding::Base64).extract(&mut out, None).unwrap();
        out
    };
    let mut decoded_qp = Vec::new();
    h.extract(&mut decoded_qp, None).unwrap();
    assert_eq!(decoded_b64, decoded_qp);
    assert_eq!(decoded_qp, "Gr\u{fc}\u{df}e aus K\u{f6}ln, bis bald!\r\nZeile zwei".as_bytes());
}

#[test]
fn base64_to_quoted_printable_text() {
    let b64 = encode(b"line one \r\nline two", &Encoding::Base64);
    let mut h = BufferContentHandler::new(b64, Encoding::Base64);
    h.set_content_type_hint(MediaType::parse("text/plain; charset=us-ascii").unwrap());
    let mut out = Vec::new();
    h.generate(&mut out, &Encoding::QuotedPrintable, 76).unwrap();
    assert_eq!(out, b"line one=20\r\nline two");
}

#[test]
fn extract_progress_is_sized_against_stored_length() {
    let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    let b64 = encode(&data, &Encoding::Base64);
    let stored_len = b64.len() as u64;
    let h = BufferContentHandler::new(b64, Encoding::Base64);

    let mut progress = RecordingProgress::default();
    let mut out = Vec::new();
    h.extract(&mut out, Some(&mut progress)).unwrap();
    assert_eq!(out, data);
    progress.assert_monotonic_to(stored_len);
}

#[test]
fn extract_progress_for_every_encoding() {
    let data: Vec<u8> = (0..60_000u32).map(|i| (i % 241) as u8).collect();
    for encoding in &ENCODINGS {
        let stored = encode(&data, encoding);
        let stored_len = stored.len() as u64;
        let h = BufferContentHandler::new(stored, encoding.clone());
        let mut progress = RecordingProgress::default();
        let mut out = Vec::new();
        h.extract(&mut out, Some(&mut progress)).unwrap();
        assert_eq!(out, data, "{encoding}");
        progress.assert_monotonic_to(stored_len);
    }
}

#[test]
fn extract_malformed_uuencode_with_progress() {
    // Short data line, blank-padded frame lines, trailing bytes after `end`.
    let stored = b"begin 644 report.txt \r\n#0V\r\n`\r\nend \r\ntrailer\r\n";
    let h = BufferContentHandler::new(&stored[..], Encoding::UuEncode);
    let mut progress = RecordingProgress::default();
    let mut out = Vec::new();
    h.extract(&mut out, Some(&mut progress)).unwrap();
    assert_eq!(out, b"Ca\0");
    progress.assert_monotonic_to(stored.len() as u64);
}

#[test]
fn extract_progress_for_raw_content() {
    let h = BufferContentHandler::from_raw(vec![7u8; 40_000]);
    let mut progress = RecordingProgress::default();
    let mut out = Vec::new();
    h.extract(&mut out, Some(&mut progress)).unwrap();
    progress.assert_monotonic_to(40_000);
}

#[test]
fn extract_raw_progress_and_bytes() {
    let h = BufferContentHandler::new(&b"=E9t=E9"[..], Encoding::QuotedPrintable);
    let mut progress = RecordingProgress::default();
    let mut out = Vec::new();
    h.extract_raw(&mut out, Some(&mut progress)).unwrap();
    assert_eq!(out, b"=E9t=E9");
    progress.assert_monotonic_to(7);
}

#[test]
fn sink_failure_propagates_and_keeps_state() {
    let h = BufferContentHandler::from_raw(vec![0u8; 10_000]);
    let mut sink = FailingSink { written: Vec::new(), limit: 100 };
    let err = h.generate(&mut sink, &Encoding::Base64, 76).unwrap_err();
    assert!(err.is_io());
    match err {
        TranscodeError::Io { source } => assert_eq!(source.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(sink.written.len(), 100);
    assert_eq!(h.get_length(), 10_000);
    assert!(!h.is_encoded());
}

#[test]
fn set_data_is_atomic_on_failure() {
    let mut h = BufferContentHandler::new(&b"SGk="[..], Encoding::Base64);
    let err = h
        .set_data_from_reader(&mut FailingReader { remaining: 5000 }, Encoding::QuotedPrintable)
        .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    assert_eq!(h.data().as_ref(), b"SGk=");
    assert_eq!(h.get_encoding(), &Encoding::Base64);

    h.set_data_from_reader(&mut &b"=41"[..], Encoding::QuotedPrintable).unwrap();
    assert_eq!(h.data().as_ref(), b"=41");
    assert_eq!(h.get_encoding(), &Encoding::QuotedPrintable);
}

#[test]
fn reads_do_not_change_metadata() {
    let mut h = BufferContentHandler::new(encode(b"metadata", &Encoding::Base64), Encoding::Base64);
    h.set_content_type_hint(MediaType::new("text", "plain"));
    let len = h.get_length();
    for target in &ENCODINGS {
        let mut out = Vec::new();
        h.generate(&mut out, target, 76).unwrap();
        h.extract(&mut out, None).unwrap();
        h.extract_raw(&mut out, None).unwrap();
    }
    assert_eq!(h.get_length(), len);
    assert_eq!(h.get_encoding(), &Encoding::Base64);
    assert!(h.get_content_type_hint().is_text());
}

#[test]
fn concurrent_readers_share_one_handler() {
    let data: Vec<u8> = (0..50_000u32).map(|i| (i * 7) as u8).collect();
    let h = BufferContentHandler::new(encode(&data, &Encoding::QuotedPrintable), Encoding::QuotedPrintable);
    std::thread::scope(|s| {
        for target in [Encoding::Base64, Encoding::None, Encoding::UuEncode, Encoding::QuotedPrintable] {
            let h = &h;
            let data = &data;
            s.spawn(move || {
                let mut out = Vec::new();
                h.generate(&mut out, &target, 76).unwrap();
                let mut back = Vec::new();
                BufferContentHandler::new(out, target).extract(&mut back, None).unwrap();
                assert_eq!(&back, data);
            });
        }
    });
}

#[test]
fn boxed_handlers_clone_independently() {
    let original: Box<dyn ContentHandler> = Box::new(BufferContentHandler::from("boxed"));
    let copy = original.clone();
    drop(original);
    let mut out = Vec::new();
    copy.extract(&mut out, None).unwrap();
    assert_eq!(out, b"boxed");
    assert!(copy.is_buffered());
}

#[test]
fn isolated_registry_without_codecs() {
    let h = BufferContentHandler::from("text");
    let empty = EncoderRegistry::new();
    let mut out = Vec::new();
    let err = h.generate_with(&empty, &mut out, &Encoding::Base64, 76).unwrap_err();
    assert!(matches!(err, TranscodeError::UnknownEncoding { .. }));
    // Raw copy needs no codec.
    h.generate_with(&empty, &mut out, &Encoding::None, 76).unwrap();
    assert_eq!(out, b"text");
}

#[test]
fn decide_then_generate() {
    let body = "Gr\u{fc}\u{df}e aus Berlin und auch aus Hamburg\r\n".as_bytes();
    let chosen = Encoding::decide(body, true);
    assert_eq!(chosen, Encoding::QuotedPrintable);
    let mut h = BufferContentHandler::from_raw(body.to_vec());
    h.set_content_type_hint(MediaType::new("text", "plain"));
    let mut out = Vec::new();
    h.generate(&mut out, &chosen, 76).unwrap();
    assert_eq!(out, b"Gr=C3=BC=C3=9Fe aus Berlin und auch aus Hamburg\r\n");
}

proptest! {
    #[test]
    fn round_trip_all_encodings(data in proptest::collection::vec(any::<u8>(), 0..2048), idx in 0usize..3) {
        let encoding = &ENCODINGS[idx];
        let encoded = encode(&data, encoding);
        let mut decoded = Vec::new();
        BufferContentHandler::new(encoded, encoding.clone()).extract(&mut decoded, None).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn passthrough_is_byte_identical(stored in proptest::collection::vec(any::<u8>(), 0..1024), idx in 0usize..6) {
        let encoding = ENCODINGS[idx].clone();
        let h = BufferContentHandler::new(stored.clone(), encoding.clone());
        let mut out = Vec::new();
        h.generate(&mut out, &encoding, 76).unwrap();
        prop_assert_eq!(out, stored);
    }

    #[test]
    fn encoded_lines_respect_max_length(data in proptest::collection::vec(any::<u8>(), 0..1024), max in 17usize..100, text in any::<bool>()) {
        for encoding in [Encoding::Base64, Encoding::QuotedPrintable, Encoding::UuEncode] {
            let mut h = BufferContentHandler::from_raw(data.clone());
            if text {
                h.set_content_type_hint(MediaType::new("text", "plain"));
            }
            let mut out = Vec::new();
            h.generate(&mut out, &encoding, max).unwrap();
            for line in out.split(|&b| b == b'\n') {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                prop_assert!(line.len() <= max, "{} line of {} > {}", encoding, line.len(), max);
            }
        }
    }
}
