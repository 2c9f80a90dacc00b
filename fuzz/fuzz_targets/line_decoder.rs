#![no_main]

use libfuzzer_sys::fuzz_target;

use logprobe_checker::LineDecoder;

fuzz_target!(|data: &[u8]| {
    for label in ["utf-8", "euc-jp", "shift_jis"] {
        let Ok(decoder) = LineDecoder::new(label) else {
            continue;
        };
        let _ = decoder.decode(data);
    }
});
