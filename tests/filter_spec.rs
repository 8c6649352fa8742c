mod common;

use blockhost::meta::{filter, is_stable_release};
use blockhost::models::{ReleaseKind, ReleaseManifest};
use common::{entry, manifest_of};
use speculate2::speculate;

speculate! {
    before {
        let mixed = manifest_of(vec![
            entry("1.20.1", ReleaseKind::Release),
            entry("23w13a", ReleaseKind::Snapshot),
            entry("1.20.1-pre1", ReleaseKind::Snapshot),
            entry("1.19.4", ReleaseKind::Release),
        ]);
    }

    describe "filter" {
        it "keeps stable releases in manifest order" {
            let candidates = filter(&mixed);
            assert_eq!(candidates.ids(), vec!["1.20.1", "1.19.4"]);
        }

        it "never lets hyphenated or snapshot ids through, whatever the order" {
            let mut entries = mixed.entries().to_vec();
            entries.reverse();
            entries.push(entry("1.21-rc1", ReleaseKind::Release));
            entries.push(entry("24w14a", ReleaseKind::Release));
            let candidates = filter(&manifest_of(entries));

            assert_eq!(candidates.ids(), vec!["1.19.4", "1.20.1"]);
            for id in candidates.ids() {
                assert!(!id.contains('-'));
                assert!(!id.contains('w'));
                assert!(is_stable_release(id));
            }
        }

        it "excludes snapshot and legacy kinds even with stable-looking ids" {
            let candidates = filter(&manifest_of(vec![
                entry("1.14.4", ReleaseKind::Snapshot),
                entry("1.0", ReleaseKind::Other),
                entry("1.2.5", ReleaseKind::Release),
            ]));
            assert_eq!(candidates.ids(), vec!["1.2.5"]);
        }

        it "is idempotent" {
            let once = filter(&mixed);
            let again = filter(&ReleaseManifest::new(
                mixed.latest().clone(),
                once.as_slice().to_vec(),
            ));
            assert_eq!(once, again);
        }

        it "returns an empty list when nothing qualifies" {
            let candidates = filter(&manifest_of(vec![
                entry("23w13a", ReleaseKind::Snapshot),
                entry("rd-132211", ReleaseKind::Other),
            ]));
            assert!(candidates.is_empty());
            assert!(candidates.ids().is_empty());
        }
    }

    describe "candidate selection" {
        it "hands over the chosen entry" {
            let candidates = filter(&mixed);
            let chosen = candidates.into_selection(1).expect("index in range");
            assert_eq!(chosen.id, "1.19.4");
        }
    }
}
