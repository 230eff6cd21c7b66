use tracing::error;

use crate::database::Store;

/// Landing-page counter. The number is cosmetic, so a store failure
/// reads as zero instead of an error. Nothing may gate on it.
pub fn get_total_stats(store: &Store, area: &str) -> i64 {
    match store.count_signups(area) {
        Ok(count) => count,
        Err(err) => {
            error!(error = %err, "Waitlist count failed");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::get_total_stats;
    use crate::database::Store;

    #[test]
    fn test_count_tracks_inserts() {
        let store = Store::open_in_memory().unwrap();

        assert_eq!(get_total_stats(&store, "valby"), 0);

        store
            .insert_signup("valby", "Astrid", "a@x.com", None, None, "AAAAAAAA", None)
            .unwrap();

        assert_eq!(get_total_stats(&store, "valby"), 1);

        store
            .insert_signup("valby", "Bo", "b@x.com", None, None, "BBBBBBBB", None)
            .unwrap();

        assert_eq!(get_total_stats(&store, "valby"), 2);
    }

    #[test]
    fn test_store_failure_reads_as_zero() {
        let store = Store::open_in_memory().unwrap();

        store
            .insert_signup("valby", "Astrid", "a@x.com", None, None, "AAAAAAAA", None)
            .unwrap();
        store.break_for_tests();

        assert_eq!(get_total_stats(&store, "valby"), 0);
    }
}
