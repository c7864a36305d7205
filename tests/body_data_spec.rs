use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use apple_peeler::body::{compression, entries, header, BodyData};
use apple_peeler::{BodyHeader, PeelError};

/// Meaningful preamble tail used by every synthetic container below.
const HEADER_SIZE: u32 = 32;

const SEP: u32 = 0xFFFF_FFFF;

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("deflate write");
    encoder.finish().expect("deflate finish")
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Length-prefixed entry records, the content of one decompressed chunk.
fn entry_stream(texts: &[&str]) -> Vec<u8> {
    let mut stream = Vec::new();
    for text in texts {
        put_u32(&mut stream, text.len() as u32);
        stream.extend_from_slice(text.as_bytes());
    }
    stream
}

fn blob_declaring(content: &[u8], declared: u32) -> Vec<u8> {
    let mut blob = Vec::new();
    put_u32(&mut blob, declared);
    blob.extend_from_slice(&deflate(content));
    blob
}

/// Declared-size word plus zlib stream, declaring the true size.
fn chunk_blob(content: &[u8]) -> Vec<u8> {
    blob_declaring(content, content.len() as u32)
}

/// Wraps a blob in the two size words framing every chunk.
fn frame(blob: &[u8]) -> Vec<u8> {
    let mut framed = Vec::new();
    put_u32(&mut framed, blob.len() as u32 + 4);
    put_u32(&mut framed, blob.len() as u32);
    framed.extend_from_slice(blob);
    framed
}

/// 96-byte preamble: zero padding, then the field words of the tail.
fn preamble(content_size: u32, chunk_count: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; header::PREAMBLE_LEN - HEADER_SIZE as usize];
    for word in [content_size, SEP, 0, HEADER_SIZE, 0, chunk_count, SEP, SEP] {
        put_u32(&mut bytes, word);
    }
    bytes
}

/// A complete container holding the given entry texts, one slice per chunk.
fn container(chunks: &[&[&str]]) -> Vec<u8> {
    let frames: Vec<Vec<u8>> = chunks
        .iter()
        .map(|texts| frame(&chunk_blob(&entry_stream(texts))))
        .collect();
    let span: u32 = frames.iter().map(|f| f.len() as u32).sum();
    let mut bytes = preamble(HEADER_SIZE + span, chunks.len() as u32);
    for framed in &frames {
        bytes.extend_from_slice(framed);
    }
    bytes
}

fn parse_preamble(bytes: &[u8]) -> Result<BodyHeader, PeelError> {
    header::parse(bytes.try_into().expect("preamble is 96 bytes"))
}

fn collect_entries(body: &BodyData) -> Vec<String> {
    body.entries()
        .collect::<Result<Vec<_>, _>>()
        .expect("entries decode")
}

#[test]
fn single_chunk_round_trip() {
    let texts = [
        r#"<d:entry id="about" d:title="about"><span class="hg">about</span></d:entry>"#,
        r#"<d:entry id="above" d:title="above"><span class="hg">above</span></d:entry>"#,
    ];
    let body = BodyData::from_bytes(container(&[&texts[..]])).expect("parse container");

    let parsed = body.header();
    assert_eq!(1, parsed.chunk_count);
    assert_eq!(HEADER_SIZE, parsed.header_size);

    let stream = entry_stream(&texts);
    let meta = body.chunks()[0];
    assert_eq!(
        header::PREAMBLE_LEN as u64 + 8,
        meta.file_offset,
        "blob offset must skip the preamble and both frame words"
    );
    assert_eq!(stream.len() as u32, meta.decompressed_size);
    assert_eq!(deflate(&stream).len() as u32, meta.compressed_size);

    let expected: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
    assert_eq!(expected, collect_entries(&body));
}

#[test]
fn chunks_inflate_in_file_order() {
    let first = [r#"<d:entry id="a">alpha</d:entry>"#];
    let second = [
        r#"<d:entry id="b">beta</d:entry>"#,
        r#"<d:entry id="c">gamma</d:entry>"#,
    ];
    let third = [r#"<d:entry id="d">delta</d:entry>"#];
    let body = BodyData::from_bytes(container(&[&first[..], &second[..], &third[..]]))
        .expect("parse container");

    assert_eq!(3, body.chunk_count());

    let expected: Vec<String> = [&first[..], &second[..], &third[..]]
        .concat()
        .iter()
        .map(|t| t.to_string())
        .collect();
    assert_eq!(expected, collect_entries(&body));

    let only_second: Vec<String> = second.iter().map(|t| t.to_string()).collect();
    assert_eq!(only_second, body.chunk_entries(1).expect("second chunk"));

    let offsets: Vec<u64> = body.chunks().iter().map(|c| c.file_offset).collect();
    for win in offsets.windows(2) {
        assert!(win[0] < win[1], "non-monotonic chunk offset");
    }
}

#[test]
fn zero_length_entry_yields_empty_string() {
    let texts = ["<d:entry>alpha</d:entry>", "", "<d:entry>omega</d:entry>"];
    let body = BodyData::from_bytes(container(&[&texts[..]])).expect("parse container");
    let decoded = collect_entries(&body);
    assert_eq!(3, decoded.len());
    assert_eq!("", decoded[1], "zero-length record must survive as an empty entry");
}

#[test]
fn multibyte_entries_survive() {
    let texts = [
        r#"<d:entry d:title="café">entrée with accents</d:entry>"#,
        r#"<d:entry d:title="中文">中文条目</d:entry>"#,
    ];
    let body = BodyData::from_bytes(container(&[&texts[..]])).expect("parse container");
    let expected: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
    assert_eq!(expected, collect_entries(&body));
}

#[test]
fn all_zero_container_is_empty() {
    let body = BodyData::from_bytes(vec![0; header::PREAMBLE_LEN]).expect("empty container");
    assert_eq!(0, body.chunk_count());
    assert_eq!(0, body.entries().count());
}

#[test]
fn zero_trailer_after_chunks_is_accepted() {
    let mut bytes = container(&[&["<d:entry>a</d:entry>"][..]]);
    bytes.extend_from_slice(&[0u8; 64]);
    let body = BodyData::from_bytes(bytes).expect("trailing zeros are padding");
    assert_eq!(1, body.chunk_count());
}

#[test]
fn dirty_trailer_is_rejected() {
    let mut bytes = container(&[&["<d:entry>a</d:entry>"][..]]);
    let file_len = bytes.len() as u64;
    bytes.extend_from_slice(&[0, 0, 0x2A]);
    let err = BodyData::from_bytes(bytes).expect_err("trailer must be zero filled");
    match err {
        PeelError::DirtyPadding { region, offset } => {
            assert_eq!("trailer", region);
            assert_eq!(file_len + 2, offset);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn dirty_preamble_padding_is_rejected() {
    let mut bytes = container(&[&["<d:entry>a</d:entry>"][..]]);
    bytes[10] = 0xAB;
    let err = BodyData::from_bytes(bytes).expect_err("padding must be zero filled");
    match err {
        PeelError::DirtyPadding { region, offset } => {
            assert_eq!("preamble", region);
            assert_eq!(10, offset);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn content_size_mismatch_is_rejected() {
    let framed = frame(&chunk_blob(&entry_stream(&["<d:entry>a</d:entry>"])));
    let declared = HEADER_SIZE + framed.len() as u32 + 4;
    let mut bytes = preamble(declared, 1);
    bytes.extend_from_slice(&framed);
    let err = BodyData::from_bytes(bytes).expect_err("span disagrees with declared size");
    match err {
        PeelError::SizeMismatch {
            context,
            expected,
            found,
        } => {
            assert_eq!("declared content size", context);
            assert_eq!(u64::from(declared), expected);
            assert_eq!(u64::from(HEADER_SIZE) + framed.len() as u64, found);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn truncated_file_is_rejected() {
    let err = BodyData::from_bytes(vec![0; 40]).expect_err("preamble needs 96 bytes");
    match err {
        PeelError::Truncated {
            context,
            needed,
            available,
        } => {
            assert_eq!("Body.data preamble", context);
            assert_eq!(96, needed);
            assert_eq!(40, available);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn truncated_chunk_blob_is_rejected() {
    let mut bytes = container(&[&["<d:entry>a</d:entry>"][..]]);
    bytes.truncate(bytes.len() - 5);
    let err = BodyData::from_bytes(bytes).expect_err("blob cut short mid-frame");
    match err {
        PeelError::Truncated { context, .. } => assert_eq!("chunk blob", context),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn undersized_chunk_blob_is_rejected() {
    // An inner size of 2 cannot even hold the declared-size word.
    let mut bytes = preamble(HEADER_SIZE + 8 + 2, 1);
    put_u32(&mut bytes, 6);
    put_u32(&mut bytes, 2);
    bytes.extend_from_slice(&[0xAB, 0xCD]);
    let err = BodyData::from_bytes(bytes).expect_err("blob too small for its size word");
    match err {
        PeelError::Truncated {
            context,
            needed,
            available,
        } => {
            assert_eq!("chunk declared size", context);
            assert_eq!(4, needed);
            assert_eq!(2, available);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn corrupt_stream_fails_on_demand() {
    // Framing is intact, so parsing succeeds; the rot surfaces on inflate.
    let mut blob = Vec::new();
    put_u32(&mut blob, 32);
    blob.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    let framed = frame(&blob);
    let mut bytes = preamble(HEADER_SIZE + framed.len() as u32, 1);
    bytes.extend_from_slice(&framed);

    let body = BodyData::from_bytes(bytes).expect("framing alone parses");
    let err = body.read_chunk(0).expect_err("garbage is not a zlib stream");
    assert!(
        matches!(err, PeelError::Decompression(_)),
        "unexpected error: {}",
        err
    );
}

#[test]
fn declared_size_mismatch_fails_inflation() {
    let stream = entry_stream(&["<d:entry>a</d:entry>"]);
    let blob = blob_declaring(&stream, stream.len() as u32 + 3);
    let err = compression::inflate_chunk(&blob).expect_err("declaration disagrees with stream");
    match err {
        PeelError::SizeMismatch {
            context,
            expected,
            found,
        } => {
            assert_eq!("inflated chunk", context);
            assert_eq!(stream.len() as u64 + 3, expected);
            assert_eq!(stream.len() as u64, found);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn bytes_after_stream_end_are_rejected() {
    let mut blob = chunk_blob(&entry_stream(&["<d:entry>a</d:entry>"]));
    blob.extend_from_slice(&[0xDE, 0xAD]);
    let err = compression::inflate_chunk(&blob).expect_err("blob must hold exactly one stream");
    match err {
        PeelError::TrailingData { context, trailing } => {
            assert_eq!("chunk zlib stream", context);
            assert_eq!(2, trailing);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn entries_iterator_surfaces_chunk_errors_once() {
    let good = entry_stream(&["<d:entry>a</d:entry>", "<d:entry>b</d:entry>"]);
    let mut corrupt = Vec::new();
    put_u32(&mut corrupt, 16);
    corrupt.extend_from_slice(&[0x11, 0x22, 0x33]);

    let frames = [frame(&chunk_blob(&good)), frame(&corrupt)];
    let span: u32 = frames.iter().map(|f| f.len() as u32).sum();
    let mut bytes = preamble(HEADER_SIZE + span, 2);
    for framed in &frames {
        bytes.extend_from_slice(framed);
    }

    let body = BodyData::from_bytes(bytes).expect("framing parses");
    let results: Vec<_> = body.entries().collect();
    assert_eq!(3, results.len(), "two entries then a single error");
    assert!(results[0].is_ok() && results[1].is_ok());
    assert!(results[2].is_err(), "corrupt chunk must surface as an error");
}

#[test]
fn separator_placement_may_vary() {
    // Same fields as the usual layout, different separator spots.
    let mut bytes = vec![0u8; header::PREAMBLE_LEN - HEADER_SIZE as usize];
    for word in [99, 0, SEP, HEADER_SIZE, 0, 7, SEP, SEP] {
        put_u32(&mut bytes, word);
    }
    let parsed = parse_preamble(&bytes).expect("alternate separator layout");
    assert_eq!(99, parsed.content_size);
    assert_eq!(HEADER_SIZE, parsed.header_size);
    assert_eq!(7, parsed.chunk_count);
}

#[test]
fn all_separator_preamble_is_rejected() {
    let err = parse_preamble(&[0xFF; 96]).expect_err("no field words to scan");
    assert!(
        matches!(err, PeelError::InvalidFormat(_)),
        "unexpected error: {}",
        err
    );
}

#[test]
fn oversized_header_size_is_rejected() {
    let mut bytes = vec![0u8; header::PREAMBLE_LEN - HEADER_SIZE as usize];
    for word in [0, SEP, 0, 200, 0, 1, SEP, SEP] {
        put_u32(&mut bytes, word);
    }
    let err = parse_preamble(&bytes).expect_err("header size larger than the preamble");
    assert!(
        matches!(err, PeelError::InvalidFormat(_)),
        "unexpected error: {}",
        err
    );
}

#[test]
fn entry_length_overrunning_chunk_is_rejected() {
    let mut stream = Vec::new();
    put_u32(&mut stream, 10);
    stream.extend_from_slice(b"abc");
    let err = entries::split_entries(&stream).expect_err("record overruns the chunk");
    match err {
        PeelError::Truncated {
            context,
            needed,
            available,
        } => {
            assert_eq!("entry text", context);
            assert_eq!(10, needed);
            assert_eq!(3, available);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn non_utf8_entry_is_rejected() {
    let mut stream = Vec::new();
    put_u32(&mut stream, 2);
    stream.extend_from_slice(&[0xFF, 0xFE]);
    let err = entries::split_entries(&stream).expect_err("entry bytes must be UTF-8");
    assert!(
        matches!(err, PeelError::InvalidUtf8(_)),
        "unexpected error: {}",
        err
    );
}

#[test]
fn scan_locates_stream_behind_unknown_prefix() {
    let mut data = vec![0x01, 0x02, 0x03];
    data.extend_from_slice(&deflate(b"scan target"));
    data.extend_from_slice(b"tail");
    let (inflated, rest) = compression::scan_for_zlib(&data).expect("stream at offset 3");
    assert_eq!(b"scan target".as_slice(), inflated);
    assert_eq!(b"tail".as_slice(), rest);
}

#[test]
fn scan_skips_plausible_but_corrupt_headers() {
    // 0x78 0x9C passes the header test but the reserved block type behind
    // it cannot inflate, so the scanner must move on to the real stream.
    let mut data = vec![0x78, 0x9C, 0xFF, 0xFF];
    data.extend_from_slice(&deflate(b"the real stream"));
    let (inflated, rest) = compression::scan_for_zlib(&data).expect("stream after decoy");
    assert_eq!(b"the real stream".as_slice(), inflated);
    assert!(rest.is_empty());
}

#[test]
fn scan_without_stream_reports_failure() {
    let err = compression::scan_for_zlib(b"no stream here").expect_err("nothing inflates");
    match err {
        PeelError::NoZlibStream { scanned } => assert_eq!(14, scanned),
        other => panic!("unexpected error: {}", other),
    }
}
