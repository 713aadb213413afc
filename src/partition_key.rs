use rand::Rng;
use rand::distributions::Alphanumeric;

/// Random `[0-9A-Za-z]` string used to spread records across shards.
pub fn generate(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
