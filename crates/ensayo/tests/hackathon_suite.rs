//! The bundled hackathon suite against an in-memory replica of the demo page.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use ensayo::{
    BaselineStore, FixtureLoader, FnDriverFactory, IsolatedRunner, MockDom, MockDriver,
    MockElement, MockPage, Outcome, RunnerConfig, ScenarioRunner, SnapshotComparator,
    SnapshotConfig, SuiteSpec,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const AMOUNTS: &str = "#transactionsTable tbody .text-right.bolder.nowrap";
const ROWS: &str = "#transactionsTable tbody tr";
const AVATAR: &str = ".top-menu-controls > .logged-user-w > .logged-user-i > .avatar-w > img";

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn load_suite() -> SuiteSpec {
    SuiteSpec::load(&workspace_root().join("suites/hackathon.yaml")).expect("suite loads")
}

fn fixtures() -> FixtureLoader {
    FixtureLoader::new(workspace_root().join("fixtures"))
}

fn log_in(dom: &mut MockDom) {
    let message = match (
        dom.value("#username").is_empty(),
        dom.value("#password").is_empty(),
    ) {
        (true, true) => "Both Username and Password must be present",
        (false, true) => "Password must be present",
        (true, false) => "Username must be present",
        (false, false) => {
            dom.remove(".alert-warning");
            show_dashboard(dom);
            return;
        }
    };
    dom.insert(".alert-warning", MockElement::new(message));
}

fn show_dashboard(dom: &mut MockDom) {
    let transactions = [
        ("Complete", "Starbucks coffee", "+ 1,250.00 USD"),
        ("Pending", "Stripe Payment Processing", "+ 952.23 USD"),
        ("Complete", "MailChimp Services", "- 320.00 USD"),
        ("Declined", "Shopify product", "+ 17.99 USD"),
        ("Pending", "Ebay Marketplace", "- 244.00 USD"),
        ("Pending", "Templates Inc", "+ 340.00 USD"),
    ];
    dom.insert(AVATAR, MockElement::new("").attr("src", "img/avatar1.png"));
    dom.insert("#amount", MockElement::new("AMOUNT"));
    dom.insert("#showExpensesChart", MockElement::new("Compare Expenses"));
    dom.set_all(
        AMOUNTS,
        transactions.iter().map(|(_, _, a)| MockElement::new(*a)).collect(),
    );
    dom.set_all(
        ROWS,
        transactions
            .iter()
            .map(|(s, d, a)| MockElement::new(format!("{s}\t{d}\t{a}")))
            .collect(),
    );
}

fn sort_by_amount(dom: &mut MockDom) {
    let amounts = dom.all(AMOUNTS).to_vec();
    let rows = dom.all(ROWS).to_vec();
    let mut order: Vec<usize> = (0..amounts.len()).collect();
    order.sort_by(|a, b| {
        let x = ensayo::parse_amount(&amounts[*a].text).unwrap_or_default();
        let y = ensayo::parse_amount(&amounts[*b].text).unwrap_or_default();
        x.total_cmp(&y)
    });
    dom.set_all(AMOUNTS, order.iter().map(|i| amounts[*i].clone()).collect());
    dom.set_all(ROWS, order.iter().map(|i| rows[*i].clone()).collect());
}

fn demo_page(url: &str) -> MockPage {
    let mut page = MockPage::new()
        .with(
            ".logo-w > a > img",
            MockElement::new("").attr("src", "img/logo-big.png"),
        )
        .element(".auth-header", "Login Form")
        .element(":nth-child(1) > label", "Username")
        .element("form > :nth-child(2) > label", "Password")
        .with(
            "#username",
            MockElement::new("").attr("placeholder", "Enter your username"),
        )
        .with(
            "#password",
            MockElement::new("").attr("placeholder", "Enter your password"),
        )
        .element("button#log-in", "Log In")
        .with(".form-check-label", MockElement::new("Remember Me").checked(false))
        .with(
            r#"[style="display: inline-block; margin-bottom:4px;"] > img"#,
            MockElement::new("").attr("src", "img/social-icons/twitter.png"),
        )
        .with(
            ":nth-child(2) > img",
            MockElement::new("").attr("src", "img/social-icons/facebook.png"),
        )
        .with(
            ":nth-child(3) > img",
            MockElement::new("").attr("src", "img/social-icons/linkedin.png"),
        )
        .on_click("button#log-in", log_in)
        .on_click("#amount", sort_by_amount)
        .on_click("#showExpensesChart", |dom| {
            dom.insert("#canvas", MockElement::new("").with_screenshot(b"chart-2017-2018".to_vec()));
            dom.insert("#addDataset", MockElement::new("Show data for next year"));
        })
        .on_click("#addDataset", |dom| {
            dom.insert("#canvas", MockElement::new("").with_screenshot(b"chart-2017-2019".to_vec()));
        });

    if url.contains("showAd=true") {
        page = page
            .with("#flashSale > img", MockElement::new("").attr("src", "img/flashSale.gif"))
            .with("#flashSale2 > img", MockElement::new("").attr("src", "img/flashSale2.gif"));
    }
    page
}

fn config() -> RunnerConfig {
    RunnerConfig::new()
        .with_step_timeout(Duration::from_secs(2))
        .with_settle_delay(Duration::ZERO)
}

fn baselines(dir: &TempDir) -> Arc<dyn SnapshotComparator> {
    Arc::new(BaselineStore::new(
        SnapshotConfig::default().with_dir(dir.path()),
    ))
}

#[test]
fn suite_expands_every_group() {
    let suite = load_suite();
    let registry = suite.expand(&fixtures(), config().viewport).unwrap();

    // 1 UI + 4 fixture rows + 2 table + 2 canvas + 1 ads
    assert_eq!(registry.len(), 10);
    assert_eq!(registry.in_group("Data-Driven Test - Login").count(), 4);
    assert_eq!(
        registry.scenarios()[1].name,
        "Login with username: \"\" and password: \"\"."
    );
}

#[tokio::test]
async fn whole_suite_passes_against_demo_page() {
    let suite = load_suite();
    let registry = suite.expand(&fixtures(), config().viewport).unwrap();
    let snapshots = TempDir::new().unwrap();

    let mut runner =
        ScenarioRunner::new(MockDriver::new(demo_page), config()).with_comparator(baselines(&snapshots));
    let run = runner
        .run_suite(&suite.name, registry.scenarios(), |_| {})
        .await;

    for result in &run.results {
        assert!(
            result.outcome.is_passed(),
            "{} -> {:?}",
            result.name,
            result.outcome
        );
    }
    assert!(run.is_success());
    assert!(snapshots.path().join("expenses-chart.png").exists());
    assert!(runner.driver().was_called("set_viewport:1800x1000"));
}

#[tokio::test]
async fn second_run_matches_baselines() {
    let suite = load_suite();
    let registry = suite.expand(&fixtures(), config().viewport).unwrap();
    let snapshots = TempDir::new().unwrap();

    for _ in 0..2 {
        let mut runner = ScenarioRunner::new(MockDriver::new(demo_page), config())
            .with_comparator(baselines(&snapshots));
        let run = runner.run_suite(&suite.name, registry.scenarios(), |_| {}).await;
        assert!(run.is_success(), "{}", ensayo::render_text(&run));
    }
}

#[tokio::test]
async fn isolated_run_matches_sequential() {
    let suite = load_suite();
    let registry = suite.expand(&fixtures(), config().viewport).unwrap();
    let snapshots = TempDir::new().unwrap();

    let factory = FnDriverFactory::new(|| MockDriver::new(demo_page));
    let runner = IsolatedRunner::new(factory, config().with_concurrency(4))
        .with_comparator(baselines(&snapshots));
    let run = runner.run_suite(&suite.name, registry.scenarios(), |_| {}).await;

    let names: Vec<_> = run.results.iter().map(|r| r.name.as_str()).collect();
    let expected: Vec<_> = registry.scenarios().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, expected);
    assert!(run.is_success(), "{}", ensayo::render_text(&run));
}

#[tokio::test]
async fn broken_page_reports_failures_without_stopping() {
    let suite = load_suite();
    let registry = suite.expand(&fixtures(), config().viewport).unwrap();
    let snapshots = TempDir::new().unwrap();

    // Login never shows an error and the sort header is gone.
    let broken = |url: &str| {
        demo_page(url)
            .on_click("button#log-in", |dom| {
                if !dom.value("#username").is_empty() && !dom.value("#password").is_empty() {
                    show_dashboard(dom);
                    dom.remove("#amount");
                }
            })
    };
    let mut runner =
        ScenarioRunner::new(MockDriver::new(broken), config()).with_comparator(baselines(&snapshots));
    let run = runner.run_suite(&suite.name, registry.scenarios(), |_| {}).await;

    assert_eq!(run.total_count(), registry.len());
    assert_eq!(run.failed_count(), 3);
    assert!(run
        .results
        .iter()
        .filter(|r| r.group == "Table sort test")
        .all(|r| matches!(&r.outcome, Outcome::Errored(e) if e.kind == "LocatorNotFound")));
    assert!(!run.is_success());
}
