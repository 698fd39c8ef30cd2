use xmlwriter::{ContentError, Document, Element, EncodingWriter, Error, Text, Writer, WriterConfig};

fn encoded(label: &str, texts: &[&str]) -> Vec<u8> {
    let mut w = Writer::new_with_encoding(Vec::new(), label, WriterConfig::new()).unwrap();
    w.start(Document::new()).unwrap();
    w.start(Element::new("hello")).unwrap();
    for text in texts {
        w.write(Text(text)).unwrap();
    }
    w.end_all_flush().unwrap();
    w.into_inner().unwrap().finish().unwrap()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn windows_1252() {
    let out = encoded("windows-1252", &["Résumé", "😀"]);
    assert!(out.starts_with(b"<?xml version=\"1.0\" encoding=\"windows-1252\"?>\n"));
    assert!(contains(&out, b"R\xe9sum\xe9&#128512;"));
}

#[test]
fn unmappable_characters_become_references() {
    let out = encoded("ISO-8859-1", &["😀"]);
    assert!(contains(&out, b"<hello>&#128512;</hello>"));
    assert!(contains(&out, b"encoding=\"ISO-8859-1\""));
}

#[test]
fn latin1_range_maps_to_single_bytes() {
    for cp in (0x20..0x80).chain(0xA0..0x100) {
        let c = std::char::from_u32(cp).unwrap();
        let mut w = EncodingWriter::new(Vec::new(), "ISO-8859-1").unwrap();
        std::io::Write::write_all(&mut w, c.to_string().as_bytes()).unwrap();
        assert_eq!(w.finish().unwrap(), vec![cp as u8], "U+{:04X}", cp);
    }
    for cp in 0x3000..0x3100 {
        let c = std::char::from_u32(cp).unwrap();
        let mut w = EncodingWriter::new(Vec::new(), "ISO-8859-1").unwrap();
        std::io::Write::write_all(&mut w, c.to_string().as_bytes()).unwrap();
        assert_eq!(w.finish().unwrap(), format!("&#{};", cp).into_bytes());
    }
}

#[test]
fn utf16_is_not_supported() {
    match Writer::new_with_encoding(Vec::new(), "utf-16be", WriterConfig::new()) {
        Err(Error::Content { cause: ContentError::UnsupportedEncoding { label } }) => assert_eq!(label, "utf-16be"),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("utf-16be should be rejected"),
    }
}

#[test]
fn declared_encoding_can_be_overridden() {
    let mut w = Writer::new_with_encoding(Vec::new(), "latin1", WriterConfig::new()).unwrap();
    assert_eq!(w.encoding(), "latin1");
    w.start(Document::new().encoding("ISO-8859-1")).unwrap();
    w.flush().unwrap();
    let out = w.into_inner().unwrap().finish().unwrap();
    assert_eq!(out, b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n");
}
