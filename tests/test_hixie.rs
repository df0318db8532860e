use breakwater::ws::hixie::{encode_text, HixieDecoder, DecodedMessage};

#[test]
fn test_encode_text_delimiters() {
    assert_eq!(encode_text("hi"), vec![0x00, b'h', b'i', 0xFF]);
    assert_eq!(encode_text(""), vec![0x00, 0xFF]);
}

#[test]
fn test_decode_single_message() {
    let stream = encode_text("hello");
    let mut decoder = HixieDecoder::new(&stream);
    assert_eq!(
        decoder.decode_next_message(),
        DecodedMessage::Text("hello".to_string())
    );
    assert_eq!(decoder.bytes_decoded(), stream.len());
}

#[test]
fn test_decode_waits_for_terminator() {
    let stream = [0x00, b'h', b'e'];
    let mut decoder = HixieDecoder::new(&stream);
    assert_eq!(decoder.decode_next_message(), DecodedMessage::NoMessage);
    assert_eq!(decoder.bytes_decoded(), 0);
}

#[test]
fn test_decode_two_messages_and_partial_third() {
    let mut stream = encode_text("one");
    stream.extend_from_slice(&encode_text("two"));
    stream.push(0x00);
    stream.push(b'x');
    let mut decoder = HixieDecoder::new(&stream);
    assert_eq!(
        decoder.decode_next_message(),
        DecodedMessage::Text("one".to_string())
    );
    assert_eq!(
        decoder.decode_next_message(),
        DecodedMessage::Text("two".to_string())
    );
    assert_eq!(decoder.decode_next_message(), DecodedMessage::NoMessage);
    assert_eq!(decoder.bytes_decoded(), stream.len() - 2);
}

#[test]
fn test_decode_bad_lead_byte_is_an_error() {
    let stream = [0x42, b'h', 0xFF];
    let mut decoder = HixieDecoder::new(&stream);
    assert_eq!(decoder.decode_next_message(), DecodedMessage::Error);
    assert_eq!(decoder.bytes_decoded(), 0);
}

#[test]
fn test_decode_empty_message() {
    let stream = [0x00, 0xFF];
    let mut decoder = HixieDecoder::new(&stream);
    assert_eq!(
        decoder.decode_next_message(),
        DecodedMessage::Text(String::new())
    );
}
