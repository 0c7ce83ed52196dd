use rangebins::{predecessor_index, predecessor_index_in, predecessor_index_linear};

extern crate rand;
use rand::{thread_rng, Rng};

fn random_sorted(n: usize, max_value: i32) -> Vec<i32> {
    let mut rng = thread_rng();
    let mut xs: Vec<i32> = (0..n).map(|_| rng.gen_range(0..max_value)).collect();
    xs.sort_unstable();
    xs
}

// Check every query from just below the smallest value to just above the
// largest against a linear scan.
fn check_all_queries(xs: &[i32], max_value: i32) {
    for query in -1..=max_value + 1 {
        let expected = predecessor_index_linear(xs, query, |x| *x);
        assert_eq!(predecessor_index(xs, query, |x| *x), expected, "{:?} {}", xs, query);

        // the result really is the first "not less than" position
        assert!(xs[..expected].iter().all(|x| *x < query));
        assert!(xs[expected..].iter().all(|x| *x >= query));
    }
}

#[test]
fn search_empty_and_single() {
    check_all_queries(&[], 3);
    check_all_queries(&[5], 10);
}

#[test]
fn search_duplicates() {
    check_all_queries(&[0, 1, 2, 3, 4, 6, 6, 6, 8, 9, 10, 11, 12], 13);
    check_all_queries(&[7; 20], 10);
    assert_eq!(predecessor_index(&[0, 1, 2, 3, 4, 6, 6, 6, 8, 9, 10, 11, 12], 6, |x| *x), 5);
}

#[test]
fn search_random() {
    for _ in 0..1000 {
        let n = thread_rng().gen_range(0..200);
        let max_value = 100;
        let xs = random_sorted(n, max_value);
        check_all_queries(&xs, max_value);
    }
}

#[test]
fn search_random_windows() {
    let mut rng = thread_rng();
    for _ in 0..1000 {
        let xs = random_sorted(rng.gen_range(0..100), 50);
        let start = rng.gen_range(0..xs.len() + 1);
        let end = rng.gen_range(start..xs.len() + 1);
        let query = rng.gen_range(-1..52);

        let expected = start + predecessor_index_linear(&xs[start..end], query, |x| *x);
        assert_eq!(predecessor_index_in(&xs, query, start, end, |x| *x), expected);
    }
}

#[test]
fn search_by_key() {
    // descending values are ascending under a negated key
    let xs: Vec<i32> = (0..50).rev().collect();
    for query in -50..=1 {
        let expected = predecessor_index_linear(&xs, query, |x| -*x);
        assert_eq!(predecessor_index(&xs, query, |x| -*x), expected);
    }
}
