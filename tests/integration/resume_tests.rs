//! Integration tests for resumable runs
//!
//! Scripted sessions stand in for the browser, so these tests can check
//! exactly which URLs each run visits and what it leaves on disk.

use crate::common::{listing, scripted_page, Workspace};
use review_sweep::crawler::load_url_list;
use review_sweep::session::{ScriptedPage, ScriptedSessionFactory};
use review_sweep::storage::{HistoryStore, ReviewSink};
use review_sweep::{RegionClassifier, ReviewRecord};
use std::collections::{HashMap, HashSet};

const URLS: [&str; 5] = [
    "https://www.foody.vn/ha-noi/pho-thin",
    "https://www.foody.vn/da-nang/mi-quang",
    "https://www.foody.vn/ho-chi-minh/com-tam",
    "https://www.foody.vn/unknown-city/lau-de",
    "https://www.foody.vn/hue/bun-bo",
];

/// Reviews with text per URL, and the scripted pages that render them
fn site() -> (HashMap<String, usize>, HashMap<String, ScriptedPage>) {
    let shapes = [(7, 1), (3, 0), (0, 2), (5, 0), (4, 4)];
    let mut counts = HashMap::new();
    let mut pages = HashMap::new();
    for (url, (reviews, blank)) in URLS.iter().zip(shapes) {
        counts.insert(url.to_string(), reviews);
        pages.insert(url.to_string(), scripted_page(&listing(reviews, blank)));
    }
    (counts, pages)
}

fn all_urls() -> Vec<String> {
    URLS.iter().map(|s| s.to_string()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_five_urls_two_workers_from_empty_history() {
    let workspace = Workspace::new();
    let (counts, pages) = site();
    let factory = ScriptedSessionFactory::new(pages);
    let dispatcher = workspace.dispatcher(2, factory.clone());

    let plan = dispatcher.plan(all_urls()).unwrap();
    assert_eq!(plan.partitions.len(), 2);
    assert_eq!(plan.partitions[0].len(), 3);
    assert_eq!(plan.partitions[1].len(), 2);

    let report = dispatcher.run_plan(plan).await;

    let history: HashSet<String> = workspace.history_lines().into_iter().collect();
    assert_eq!(history.len(), 5);
    assert_eq!(history, all_urls().into_iter().collect());

    let written: usize = workspace.shards().values().map(Vec::len).sum();
    let expected: usize = counts.values().sum();
    assert_eq!(written, expected);
    assert_eq!(report.persisted_reviews(), expected);

    assert_eq!(factory.opened(), 2);
    assert_eq!(factory.closed(), 2);
}

#[tokio::test]
async fn test_resume_visits_only_unrecorded_urls() {
    let workspace = Workspace::new();
    let history = workspace.history();
    history.mark_done(URLS[0]).unwrap();
    history.mark_done(URLS[3]).unwrap();

    let (_, pages) = site();
    let factory = ScriptedSessionFactory::new(pages);
    let dispatcher = workspace.dispatcher(2, factory.clone());

    let report = dispatcher.run_plan(dispatcher.plan(all_urls()).unwrap()).await;

    assert_eq!(report.already_done, 2);
    assert_eq!(report.scheduled, 3);
    let visited: HashSet<String> = factory.navigations().into_iter().collect();
    let expected: HashSet<String> = [URLS[1], URLS[2], URLS[4]]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(visited, expected);
    assert!(workspace.shard("MienBac").is_empty());
    assert!(workspace.shard("Other").is_empty());
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let workspace = Workspace::new();
    let (_, pages) = site();
    workspace.write_url_list(&all_urls());

    let first = ScriptedSessionFactory::new(pages.clone());
    workspace
        .dispatcher(2, first)
        .run(&workspace.url_list())
        .await
        .unwrap();
    let shards_after_first = workspace.shards();
    let history_after_first = workspace.history_lines();

    let second = ScriptedSessionFactory::new(pages);
    let report = workspace
        .dispatcher(2, second.clone())
        .run(&workspace.url_list())
        .await
        .unwrap();

    assert_eq!(report.scheduled, 0);
    assert!(report.workers.is_empty());
    assert!(second.navigations().is_empty());
    assert_eq!(second.opened(), 0);
    assert_eq!(workspace.shards(), shards_after_first);
    assert_eq!(workspace.history_lines(), history_after_first);
}

#[tokio::test]
async fn test_history_only_grows() {
    let workspace = Workspace::new();
    let (_, pages) = site();

    // Run over the first two URLs, then over all five
    let dispatcher = workspace.dispatcher(1, ScriptedSessionFactory::new(pages.clone()));
    dispatcher
        .run_plan(dispatcher.plan(all_urls()[..2].to_vec()).unwrap())
        .await;
    let before = std::fs::read_to_string(workspace.history_path()).unwrap();

    let dispatcher = workspace.dispatcher(3, ScriptedSessionFactory::new(pages));
    dispatcher
        .run_plan(dispatcher.plan(all_urls()).unwrap())
        .await;
    let after = std::fs::read_to_string(workspace.history_path()).unwrap();

    assert!(after.starts_with(&before));
    assert_eq!(workspace.history_lines().len(), 5);
}

#[tokio::test]
async fn test_every_record_lands_in_its_region_shard() {
    let workspace = Workspace::new();
    let (_, pages) = site();
    let dispatcher = workspace.dispatcher(3, ScriptedSessionFactory::new(pages));
    dispatcher
        .run_plan(dispatcher.plan(all_urls()).unwrap())
        .await;

    let classifier = RegionClassifier::default();
    let by_source: HashMap<String, String> = URLS
        .iter()
        .map(|url| {
            let unit = classifier.classify(url);
            (unit.source_name(), unit.region)
        })
        .collect();

    let shards = workspace.shards();
    assert!(!shards.is_empty());
    for (region, records) in shards {
        for record in records {
            assert_eq!(by_source[&record.source_name], region);
            assert!(!record.text.trim().is_empty());
        }
    }
}

#[tokio::test]
async fn test_failed_navigation_is_retried_next_run() {
    let workspace = Workspace::new();
    let (_, mut pages) = site();
    let missing = pages.remove(URLS[2]).unwrap();

    let dispatcher = workspace.dispatcher(2, ScriptedSessionFactory::new(pages.clone()));
    let report = dispatcher
        .run_plan(dispatcher.plan(all_urls()).unwrap())
        .await;
    assert_eq!(report.navigation_failures(), 1);
    assert!(!workspace.history_lines().contains(&URLS[2].to_string()));

    pages.insert(URLS[2].to_string(), missing);
    let factory = ScriptedSessionFactory::new(pages);
    let dispatcher = workspace.dispatcher(2, factory.clone());
    dispatcher
        .run_plan(dispatcher.plan(all_urls()).unwrap())
        .await;

    assert_eq!(factory.navigations(), vec![URLS[2].to_string()]);
    assert_eq!(workspace.history_lines().len(), 5);
}

#[tokio::test]
async fn test_crash_between_persist_and_record_duplicates_batch() {
    let workspace = Workspace::new();
    let url = URLS[1];
    let (counts, pages) = site();
    let classifier = RegionClassifier::default();
    let unit = classifier.classify(url);

    // A previous run wrote the batch, then died before recording the URL
    let batch: Vec<ReviewRecord> = (0..counts[url])
        .map(|i| ReviewRecord {
            review_id: format!("{}_{}", unit.locality, 10000 + i),
            source_name: unit.source_name(),
            locality: unit.locality.clone(),
            author: "Lan".to_string(),
            text: format!("Mon an ngon so {}", i),
            score: 8.5,
        })
        .collect();
    workspace.sink().append_batch(&unit.region, &batch).unwrap();

    let dispatcher = workspace.dispatcher(1, ScriptedSessionFactory::new(pages));
    dispatcher
        .run_plan(dispatcher.plan(vec![url.to_string()]).unwrap())
        .await;

    let shard = workspace.shard(&unit.region);
    assert_eq!(shard.len(), counts[url] * 2);
    let texts: HashSet<&str> = shard.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts.len(), counts[url]);
    assert_eq!(workspace.history_lines(), vec![url.to_string()]);
}

#[test]
fn test_url_list_duplicates_collapse() {
    let workspace = Workspace::new();
    let mut urls = all_urls();
    urls.push(format!("  {}  ", URLS[0]));
    urls.push(String::new());
    workspace.write_url_list(&urls);

    assert_eq!(load_url_list(&workspace.url_list()).unwrap(), all_urls());
}
