#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

extern crate weblaunch;
use weblaunch::launching::browser::BrowserDescriptor;
use weblaunch::launching::windows::scan_export;

/// An arbitrary registry export: a pile of lines, written either as
/// UTF-16LE with a byte order mark (the NT-family regedit format) or
/// as raw single-byte text (the 9x format).
#[derive(Debug, Arbitrary)]
struct TestExport {
    lines: Vec<String>,
    utf16: bool,
}

impl TestExport {
    fn encode(&self) -> Vec<u8> {
        let text = self.lines.join("\r\n");
        if self.utf16 {
            let mut bytes = vec![0xFF, 0xFE];
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            bytes
        } else {
            text.into_bytes()
        }
    }
}

fuzz_target!(|data: TestExport| {
    let candidates = vec![
        BrowserDescriptor::parse(';', "Internet Explorer;iexplore").unwrap(),
        BrowserDescriptor::parse(';', "FireFox;firefox").unwrap(),
        BrowserDescriptor::parse(';', "Opera;opera").unwrap(),
    ];

    // The scanner must not panic, and can never find more browsers
    // than it was asked to look for.
    let catalog = scan_export(&data.encode(), &candidates);
    assert!(catalog.len() <= candidates.len());
});
