#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes is canonical and must re-encode to itself.
    if let Ok(value) = keywise::decode(data) {
        let bytes = keywise::encode(&value).expect("decoded value must re-encode");
        assert_eq!(bytes, data);
    }
});
