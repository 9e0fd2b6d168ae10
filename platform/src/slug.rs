//! Deployment identity allocation
//!
//! Produces memorable random identifiers used as the log channel key, the
//! storage key prefix and the routing subdomain of a deployment. Uniqueness
//! is best-effort: identifiers are randomized, never centrally checked.

use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "amber", "bold", "brave", "bright", "calm", "clever", "cosmic", "crisp",
    "daring", "dusty", "eager", "early", "fancy", "fast", "gentle", "glad",
    "golden", "happy", "humble", "icy", "jolly", "keen", "late", "lively",
    "lucky", "mellow", "misty", "neat", "noble", "pale", "proud", "quiet",
    "rapid", "rosy", "royal", "rustic", "silent", "sleek", "snowy", "solar",
    "steady", "sunny", "swift", "tidy", "vivid", "warm", "wild", "witty",
];

const NOUNS: &[&str] = &[
    "anchor", "aspen", "badger", "beacon", "birch", "breeze", "brook", "canyon",
    "cedar", "cliff", "cloud", "comet", "coral", "crane", "delta", "dune",
    "ember", "falcon", "fern", "fjord", "forest", "fox", "glacier", "grove",
    "harbor", "hawk", "heron", "island", "lagoon", "lantern", "maple", "meadow",
    "meteor", "orchid", "otter", "pebble", "pine", "prairie", "raven", "reef",
    "ridge", "river", "sparrow", "summit", "tundra", "valley", "willow", "wren",
];

const SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 4;

/// Generate a memorable random deployment identifier, e.g. `quiet-harbor-x4k2`
pub fn generate() -> String {
    let mut rng = rand::thread_rng();

    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
        .collect();

    format!("{}-{}-{}", adjective, noun, suffix)
}
