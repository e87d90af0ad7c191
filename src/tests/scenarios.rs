use crate::bitio::{BitReader, BitWriter};
use crate::code::{bits_to_represent, NUM_SPECIALS};
use crate::{compress, decompress, Decoder, Encoder, Error, Options};

const PATTERN: &[u8; 50] = b"The quick brown fox jumps over the lazy dog 012345";

fn skip_header(reader: &mut BitReader<&[u8]>) {
    reader.read_bits(8).unwrap();
    reader.read_bits(24).unwrap();
    reader.read_bits(1).unwrap();
}

#[test]
fn test_single_preloaded_byte() {
    let options = Options::default().with_max_code_bits(12).unwrap();
    let compressed = compress(&[0x41], options).unwrap();

    let mut reader = BitReader::new(&compressed[..]);
    skip_header(&mut reader);
    assert_eq!(reader.read_bits(9).unwrap(), Some(NUM_SPECIALS + 0x41));
    assert_eq!(reader.read_bits(9).unwrap(), None);

    assert_eq!(decompress(&compressed).unwrap(), vec![0x41]);
}

#[test]
fn test_run_of_one_symbol() {
    let compressed = compress(b"AAAA", Options::default()).unwrap();
    assert_eq!(decompress(&compressed).unwrap(), b"AAAA");
}

#[test]
fn test_every_byte_value_escaped_once() {
    let options = Options::default().with_escape(true);
    let input: Vec<u8> = (0..300u32).map(|i| (i % 256) as u8).collect();

    let mut encoder = Encoder::new(options, Vec::new()).unwrap();
    encoder.extend(input.iter().copied()).unwrap();
    let (compressed, stats) = encoder.finish_with_stats().unwrap();

    assert_eq!(stats.escapes, 256);
    assert_eq!(stats.prunes, 0);
    assert_eq!(decompress(&compressed).unwrap(), input);
}

#[test]
fn test_repeating_pattern_prunes_small_table() {
    let options = Options::default()
        .with_max_code_bits(9)
        .unwrap()
        .with_window(5)
        .unwrap();
    let input = PATTERN.repeat(200);

    let mut encoder = Encoder::new(options, Vec::new()).unwrap();
    let mut prunes = 0;
    for &byte in &input {
        encoder.push(byte).unwrap();
        let stats = encoder.stats();
        if stats.prunes != prunes {
            prunes = stats.prunes;
            assert_eq!(
                encoder.width(),
                bits_to_represent(encoder.dictionary().len()),
                "width recomputed right after prune {}",
                prunes
            );
        }
    }
    assert!(prunes >= 1);

    let compressed = encoder.finish().unwrap();
    let mut output = Vec::new();
    let stats = Decoder::new(&compressed[..])
        .unwrap()
        .decode_into(&mut output)
        .unwrap();
    assert_eq!(output, input);
    assert_eq!(stats.prunes, prunes);
}

#[test]
fn test_escape_mode_prunes_and_recovers() {
    let options = Options::default()
        .with_max_code_bits(9)
        .unwrap()
        .with_window(3)
        .unwrap()
        .with_escape(true);
    let mut input = PATTERN.repeat(40);
    input.extend((0..=255u8).rev());
    input.extend(PATTERN.repeat(40));

    let mut encoder = Encoder::new(options, Vec::new()).unwrap();
    encoder.extend(input.iter().copied()).unwrap();
    let (compressed, stats) = encoder.finish_with_stats().unwrap();

    assert!(stats.prunes >= 1);
    assert!(stats.escapes >= 256);
    assert_eq!(decompress(&compressed).unwrap(), input);
}

#[test]
fn test_corrupt_header_produces_no_output() {
    let mut writer = BitWriter::new(Vec::new());
    writer.write_bits(255, 8).unwrap();
    writer.write_bits(0, 24).unwrap();
    writer.write_bits(0, 1).unwrap();
    writer.write_bits(NUM_SPECIALS + 0x41, 9).unwrap();
    let compressed = writer.finish().unwrap();

    let output: Vec<u8> = Vec::new();
    let err = match Decoder::new(&compressed[..]) {
        Ok(_) => panic!("header with 255 max code bits accepted"),
        Err(err) => err,
    };
    assert!(matches!(err, Error::InvalidHeader { max_code_bits: 255 }));
    assert!(err.is_corruption());
    assert!(output.is_empty());
    assert!(decompress(&compressed).is_err());
}

#[test]
fn test_separate_streams_do_not_interfere() {
    let options = Options::default().with_window(16).unwrap();
    let mut first = Encoder::new(options, Vec::new()).unwrap();
    let mut second = Encoder::new(options.with_escape(true), Vec::new()).unwrap();

    for (&a, &b) in PATTERN.iter().zip(PATTERN.iter().rev()) {
        first.push(a).unwrap();
        second.push(b).unwrap();
    }

    let first = first.finish().unwrap();
    let second = second.finish().unwrap();
    assert_eq!(decompress(&first).unwrap(), PATTERN.to_vec());

    let mut reversed = PATTERN.to_vec();
    reversed.reverse();
    assert_eq!(decompress(&second).unwrap(), reversed);
}
