// Filter Facade Tests for bloomlist
// These tests exercise add / check / double_check / remove on a fresh filter

use bloomlist::{Blacklist, FilterConfig, Options, Verdict};
use tempfile::TempDir;

fn open(dir: &TempDir, size: usize, depths: &[i64]) -> Blacklist {
    let config = FilterConfig::new(size, depths.to_vec()).unwrap();
    Blacklist::open(dir.path().join("filter.bin"), config, Options::default().sync_journal(false))
}

/// Test adding one url and checking it
#[test]
fn test_add_and_check_valid_url() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 8, &[1]);

    assert!(!bf.check("www.example.com0"));
    assert!(!bf.double_check("www.example.com0"));

    bf.add("www.example.com0");

    assert!(bf.check("www.example.com0"));
    assert!(bf.double_check("www.example.com0"));
}

/// Test the literal single-add scenario on a 16-bit filter
#[test]
fn test_add_test_com() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 16, &[1]);

    bf.add("test.com");
    assert!(bf.check("test.com"));
    assert!(bf.double_check("test.com"));
}

/// Test adding several urls and checking each
#[test]
fn test_add_multiple_and_check_each() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 16, &[1]);

    bf.add("url1");
    bf.add("url2");

    for url in ["url1", "url2"] {
        assert!(bf.check(url));
        assert!(bf.double_check(url));
    }
    assert_eq!(bf.len(), 2);
}

/// Test that urls never added are never exactly present
#[test]
fn test_never_added_is_not_double_checked() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 16, &[1, 2]);

    for i in 0..100 {
        bf.add(&format!("added{}.com", i));
    }

    // A 16-bit filter this full answers check() true for almost anything,
    // but the exact set must not
    for i in 0..100 {
        assert!(!bf.double_check(&format!("never{}.com", i)));
    }
}

/// Test that removal clears the exact answer but not the Bloom answer
#[test]
fn test_add_remove_check() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 16, &[1]);

    bf.add("www.remove.com");
    assert!(bf.remove("www.remove.com"));

    assert!(bf.check("www.remove.com"));
    assert!(!bf.double_check("www.remove.com"));
    assert_eq!(bf.lookup("www.remove.com"), Verdict::FalsePositive);
}

/// Test removing a url that was never added
#[test]
fn test_remove_non_existent() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 16, &[1]);

    assert!(!bf.remove("www.neveradded.com"));
    assert!(!bf.check("www.neveradded.com"));
    assert!(!bf.double_check("www.neveradded.com"));
    assert!(bf.is_empty());
}

/// Test add, remove, then add again
#[test]
fn test_add_remove_readd() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 16, &[1]);

    bf.add("www.readd.com");
    bf.remove("www.readd.com");
    assert!(!bf.double_check("www.readd.com"));

    bf.add("www.readd.com");
    assert!(bf.check("www.readd.com"));
    assert!(bf.double_check("www.readd.com"));
}

/// Test the empty string as an item
#[test]
fn test_empty_string() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 16, &[1]);

    assert!(!bf.check(""));
    assert!(!bf.double_check(""));
    assert!(!bf.remove(""));

    bf.add("");
    assert!(bf.check(""));
    assert!(bf.double_check(""));
}

/// Test an item made of special characters
#[test]
fn test_special_characters() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 16, &[1]);
    let weird = "@#$%^&*()_+|";

    assert!(!bf.check(weird));
    assert!(!bf.double_check(weird));

    bf.add(weird);
    assert!(bf.check(weird));
    assert!(bf.double_check(weird));
}

/// Test a very large bit array
#[test]
fn test_very_large_bit_array() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 100_000, &[1]);

    bf.add("large.com");
    assert!(bf.check("large.com"));
    assert!(bf.double_check("large.com"));
}

/// Test very long urls, including removal
#[test]
fn test_very_long_url() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 16, &[1]);
    let long_a = "a".repeat(1000);
    let long_b = "b".repeat(1000);

    bf.add(&long_a);
    assert!(bf.check(&long_a));
    assert!(bf.double_check(&long_a));

    bf.add(&long_b);
    bf.remove(&long_b);
    assert!(bf.check(&long_b));
    assert!(!bf.double_check(&long_b));
}

/// Test the same depth used several times
#[test]
fn test_repeated_hash_function() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 16, &[1, 1, 1]);

    bf.add("repeat.com");
    assert!(bf.check("repeat.com"));
    assert!(bf.double_check("repeat.com"));
}

/// Test no false negatives over a larger random workload
#[test]
fn test_no_false_negatives_random() {
    use rand::Rng;

    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 4096, &[1, 2, 3]);
    let mut rng = rand::rng();

    let urls: Vec<String> = (0..500).map(|_| format!("www.{:016x}.com", rng.random::<u64>())).collect();
    for url in &urls {
        bf.add(url);
    }

    for url in &urls {
        assert!(bf.check(url), "false negative for {}", url);
        assert!(bf.double_check(url));
    }
}

/// Test that a roomy filter rarely reports never-added urls
#[test]
fn test_false_positive_rate_is_reasonable() {
    let dir = TempDir::new().unwrap();
    let bf = open(&dir, 1 << 16, &[1, 2, 3, 4]);

    for i in 0..1000 {
        bf.add(&format!("present{}.com", i));
    }

    let false_positives = (0..10_000).filter(|i| bf.check(&format!("absent{}.com", i))).count();
    println!("False positives: {}/10000", false_positives);
    // Expected rate is roughly 0.02%
    assert!(false_positives < 100, "Too many false positives: {}", false_positives);
}
