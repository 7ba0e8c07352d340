#![no_main]
use libfuzzer_sys::fuzz_target;

// Every rejection must land on MalformedFmri (L4); anything that decodes
// must round-trip through encode (L1).
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    match sas_topo_fmri::decode(text) {
        Ok(fmri) => {
            let Ok(reencoded) = sas_topo_fmri::encode(&fmri) else {
                panic!("decode succeeded but encode of its own output failed");
            };
            let Ok(redecoded) = sas_topo_fmri::decode(&reencoded) else {
                panic!("re-decoding a freshly encoded FMRI failed");
            };
            assert_eq!(redecoded, fmri, "decode(encode(n)) != n for {text:?}");
        }
        Err(_) => {}
    }
});
