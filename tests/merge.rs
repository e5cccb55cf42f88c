use snapmag::gallery::merge;
use snapmag::gallery::record::{ContentKey, ImageRecord, Locator};

fn record(id: &str, path: &str, created_at: i64) -> ImageRecord {
    ImageRecord::new(ContentKey::new(id), Locator::new(path), created_at)
}

fn lists() -> Vec<Vec<ImageRecord>> {
    vec![
        vec![],
        vec![record("a", "/a1", 5)],
        vec![record("a", "/a2", 9), record("b", "/b", 7), record("a", "/a1", 3)],
        vec![
            record("x", "/x1", 1),
            record("y", "/y1", 1),
            record("x", "/x2", 1),
            record("z", "/z", 4),
            record("y", "/y2", 0),
        ],
    ]
}

#[test]
fn merge_is_idempotent() {
    for list in lists() {
        let once = merge(&list);
        assert_eq!(merge(&once), once);
    }
}

#[test]
fn keeps_oldest_capture_per_identity() {
    for list in lists() {
        let merged = merge(&list);
        for rec in &merged {
            let oldest = list
                .iter()
                .filter(|r| r.identity == rec.identity)
                .map(|r| r.created_at)
                .min();
            assert_eq!(Some(rec.created_at), oldest);
            assert_eq!(merged.iter().filter(|r| r.identity == rec.identity).count(), 1);
        }
        let mut ids: Vec<_> = list.iter().map(|r| r.identity.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(merged.len(), ids.len());
    }
}

#[test]
fn result_is_newest_first() {
    for list in lists() {
        let merged = merge(&list);
        assert!(merged.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}

#[test]
fn earlier_record_wins_on_equal_timestamps() {
    let merged = merge(&[record("x", "/x1", 1), record("x", "/x2", 1)]);
    assert_eq!(merged, vec![record("x", "/x1", 1)]);
}

#[test]
fn order_does_not_depend_on_arrival() {
    for list in lists() {
        let mut reversed = list.clone();
        reversed.reverse();
        let forward: Vec<(ContentKey, i64)> = merge(&list)
            .into_iter()
            .map(|r| (r.identity, r.created_at))
            .collect();
        let backward: Vec<(ContentKey, i64)> = merge(&reversed)
            .into_iter()
            .map(|r| (r.identity, r.created_at))
            .collect();
        assert_eq!(forward, backward);
    }
    let ids: Vec<String> = merge(&[record("y", "/y", 5), record("x", "/x", 5)])
        .into_iter()
        .map(|r| r.identity.to_string())
        .collect();
    assert_eq!(ids, ["x", "y"]);
}
