use serde::{Deserialize, Serialize};

/// Run-length encoded chunk arrays: flat `count, value, count, value, ...`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RleChunk {
    pub blocks: Vec<u32>,
    pub metadata: Vec<u32>,
}

impl RleChunk {
    /// Number of (count, value) runs across both arrays.
    pub fn run_count(&self) -> usize {
        self.blocks.len() / 2 + self.metadata.len() / 2
    }
}

/// What a decode had to repair. A clean stream reports all false.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Stream ended before the destination was full; the rest is zero.
    pub truncated: bool,
    /// Runs extended past the destination and were clipped.
    pub overflowed: bool,
    /// A trailing count had no value and was ignored.
    pub odd_length: bool,
    /// A run value did not fit a byte and was clamped.
    pub clamped: bool,
}

impl DecodeReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        !(self.truncated || self.overflowed || self.odd_length || self.clamped)
    }

    pub fn merge(&mut self, other: DecodeReport) {
        self.truncated |= other.truncated;
        self.overflowed |= other.overflowed;
        self.odd_length |= other.odd_length;
        self.clamped |= other.clamped;
    }
}

pub fn rle_encode(data: &[u8]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut iter = data.iter().copied();
    let Some(mut cur) = iter.next() else {
        return out;
    };
    let mut run: u32 = 1;
    for v in iter {
        if v == cur {
            run += 1;
        } else {
            out.push(run);
            out.push(cur as u32);
            cur = v;
            run = 1;
        }
    }
    out.push(run);
    out.push(cur as u32);
    out
}

/// Replays runs into `dst`, never writing past its end. Unwritten bytes are zeroed.
pub fn rle_decode(src: &[u32], dst: &mut [u8]) -> DecodeReport {
    let mut report = DecodeReport {
        odd_length: src.len() % 2 == 1,
        ..DecodeReport::default()
    };
    let mut at = 0usize;
    for pair in src.chunks_exact(2) {
        let (count, value) = (pair[0] as usize, pair[1]);
        if value > u8::MAX as u32 {
            report.clamped = true;
        }
        let v = value.min(u8::MAX as u32) as u8;
        let room = dst.len() - at;
        let n = count.min(room);
        dst[at..at + n].fill(v);
        at += n;
        if count > room {
            report.overflowed = true;
            break;
        }
    }
    if at < dst.len() {
        report.truncated = true;
        dst[at..].fill(0);
    }
    report
}
