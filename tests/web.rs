use async_trait::async_trait;
use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lingua_craft::db::{MasteryRepository, MemoryMasteryRepository};
use lingua_craft::domain::{EducationLevel, FeedbackResponse, WordItem, SERVICE_UNAVAILABLE_FEEDBACK};
use lingua_craft::gateway::{GatewayError, SentenceGrader, WordSource};
use lingua_craft::handlers;
use lingua_craft::state::AppState;

type Exclusions = Arc<Mutex<Vec<Vec<String>>>>;

/// Serves batches `a0..a4`, `b0..b4`, ... unless told to fail.
struct FakeWords {
  fail: bool,
  calls: AtomicUsize,
  exclusions: Exclusions,
}

#[async_trait]
impl WordSource for FakeWords {
  async fn fetch_words(&self, _: EducationLevel, exclude: &[String]) -> Result<Vec<WordItem>, GatewayError> {
    self.exclusions.lock().unwrap().push(exclude.to_vec());
    let call = self.calls.fetch_add(1, Ordering::SeqCst);
    if self.fail {
      return Err(GatewayError::NotConfigured("GEMINI_API_KEY"));
    }
    let prefix = (b'a' + call as u8) as char;
    Ok(
      (0..5)
        .map(|i| WordItem {
          word: format!("{prefix}{i}"),
          definition: format!("meaning of {prefix}{i} (意思)"),
          part_of_speech: "verb".to_string(),
          example: format!("They {prefix}{i} every day."),
        })
        .collect(),
    )
  }
}

/// Accepts any sentence containing "good"; optionally unreachable.
struct FakeGrader {
  fail: bool,
}

#[async_trait]
impl SentenceGrader for FakeGrader {
  async fn evaluate_sentence(&self, _: &WordItem, sentence: &str) -> Result<FeedbackResponse, GatewayError> {
    if self.fail {
      return Err(GatewayError::EmptyResponse);
    }
    let is_correct = sentence.contains("good");
    Ok(FeedbackResponse {
      is_correct,
      feedback: if is_correct { "用得很好！" } else { "搭配不太对。" }.to_string(),
      improved_sentence: is_correct.then(|| "A more natural good sentence.".to_string()),
    })
  }
}

struct Harness {
  server: TestServer,
  app: Router,
  repository: Arc<MemoryMasteryRepository>,
  exclusions: Exclusions,
}

impl Harness {
  /// Another browser with its own cookie jar on the same app.
  fn second_browser(&self) -> TestServer {
    browser(self.app.clone())
  }
}

fn browser(app: Router) -> TestServer {
  let mut server = TestServer::new(app).unwrap();
  server.save_cookies();
  server
}

fn harness(words_fail: bool, grader_fail: bool) -> Harness {
  let repository = Arc::new(MemoryMasteryRepository::default());
  let exclusions = Exclusions::default();
  let state = AppState::new(
    repository.clone(),
    Arc::new(FakeWords {
      fail: words_fail,
      calls: AtomicUsize::new(0),
      exclusions: exclusions.clone(),
    }),
    Arc::new(FakeGrader { fail: grader_fail }),
  );
  let app = handlers::router(state);
  Harness {
    server: browser(app.clone()),
    app,
    repository,
    exclusions,
  }
}

async fn state(server: &TestServer) -> Value {
  server.get("/api/state").await.json::<Value>()
}

async fn start(server: &TestServer) {
  let response = server
    .post("/level")
    .form(&[("level", "middle")])
    .await;
  response.assert_status(StatusCode::SEE_OTHER);
  assert_eq!(response.header("location"), "/");
}

#[tokio::test]
async fn test_first_visit_shows_onboarding_and_sets_cookie() {
  let h = harness(false, false);

  let response = h.server.get("/").await;
  response.assert_status_ok();
  assert!(!response.cookie("lc_session").value().is_empty());

  let page = response.text();
  assert!(page.contains("欢迎使用"));
  assert!(page.contains("中考必备"));
  assert!(page.contains(r#"value="professional""#));
}

#[tokio::test]
async fn test_select_level_starts_learning() {
  let h = harness(false, false);
  start(&h.server).await;

  let snapshot = state(&h.server).await;
  assert_eq!(snapshot["screen"], "learning");
  assert_eq!(snapshot["level"], "middle");
  assert_eq!(snapshot["wordQueue"].as_array().unwrap().len(), 5);
  assert_eq!(snapshot["currentWord"]["word"], "a0");

  let page = h.server.get("/").await.text();
  assert!(page.contains("a0"));
  assert!(page.contains("初中"));
  assert!(page.contains("请用 &quot;a0&quot; 造句") || page.contains("请用 &#34;a0&#34; 造句"));
}

#[tokio::test]
async fn test_start_failure_shows_notice_once() {
  let h = harness(true, false);
  start(&h.server).await;

  let snapshot = state(&h.server).await;
  assert_eq!(snapshot["screen"], "onboarding");
  assert_eq!(snapshot["level"], Value::Null);

  let page = h.server.get("/").await.text();
  assert!(page.contains("启动失败，请检查您的网络连接或 API Key。"));

  let again = h.server.get("/").await.text();
  assert!(!again.contains("启动失败"));
}

#[tokio::test]
async fn test_unknown_level_is_ignored() {
  let h = harness(false, false);
  h.server
    .post("/level")
    .form(&[("level", "kindergarten")])
    .await
    .assert_status(StatusCode::SEE_OTHER);

  assert_eq!(state(&h.server).await["screen"], "onboarding");
}

#[tokio::test]
async fn test_correct_sentence_then_advance_records_mastery() {
  let h = harness(false, false);
  start(&h.server).await;

  h.server
    .post("/sentence")
    .form(&[("sentence", "This is a good a0.")])
    .await
    .assert_status(StatusCode::SEE_OTHER);

  let page = h.server.get("/").await.text();
  assert!(page.contains("太棒了！"));
  assert!(page.contains("更地道的表达："));
  assert!(page.contains("下一个单词"));

  h.server.post("/advance").await.assert_status(StatusCode::SEE_OTHER);

  let snapshot = state(&h.server).await;
  assert_eq!(snapshot["currentIndex"], 1);
  assert_eq!(snapshot["masteredItems"][0]["word"], "a0");
  assert_eq!(snapshot["masteredItems"][0]["userSentence"], "This is a good a0.");
  assert_eq!(h.repository.load().unwrap().len(), 1);

  // The next word starts with a clean attempt
  assert_eq!(snapshot["attempt"]["sentence"], "");
}

#[tokio::test]
async fn test_incorrect_sentence_keeps_word() {
  let h = harness(false, false);
  start(&h.server).await;

  h.server
    .post("/sentence")
    .form(&[("sentence", "a0 bad")])
    .await;
  h.server.post("/advance").await.assert_status(StatusCode::SEE_OTHER);

  let snapshot = state(&h.server).await;
  assert_eq!(snapshot["currentIndex"], 0);
  assert_eq!(snapshot["attempt"]["feedback"]["isCorrect"], false);
  assert!(snapshot["masteredItems"].as_array().unwrap().is_empty());

  let page = h.server.get("/").await.text();
  assert!(page.contains("再接再厉！"));
  assert!(page.contains("搭配不太对。"));
}

#[tokio::test]
async fn test_grader_failure_shows_unavailable_feedback() {
  let h = harness(false, true);
  start(&h.server).await;

  h.server
    .post("/sentence")
    .form(&[("sentence", "good")])
    .await
    .assert_status(StatusCode::SEE_OTHER);

  let snapshot = state(&h.server).await;
  assert_eq!(snapshot["attempt"]["feedback"]["isCorrect"], false);
  assert_eq!(snapshot["attempt"]["feedback"]["feedback"], SERVICE_UNAVAILABLE_FEEDBACK);
  assert_eq!(snapshot["attempt"]["isChecking"], false);
}

#[tokio::test]
async fn test_skipping_whole_batch_refills() {
  let h = harness(false, false);
  start(&h.server).await;

  for _ in 0..5 {
    h.server.post("/skip").await.assert_status(StatusCode::SEE_OTHER);
  }

  let snapshot = state(&h.server).await;
  assert_eq!(snapshot["currentIndex"], 0);
  assert_eq!(snapshot["currentWord"]["word"], "b0");
  assert!(snapshot["masteredItems"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_hint_reveals_example() {
  let h = harness(false, false);
  start(&h.server).await;
  assert!(!h.server.get("/").await.text().contains("They a0 every day."));

  h.server.post("/hint").await.assert_status(StatusCode::SEE_OTHER);
  let page = h.server.get("/").await.text();
  assert!(page.contains("例句参考："));
  assert!(page.contains("They a0 every day."));
}

#[tokio::test]
async fn test_review_lists_mastered_words() {
  let h = harness(false, false);
  start(&h.server).await;

  h.server.post("/review/toggle").await;
  let empty = h.server.get("/").await.text();
  assert!(empty.contains("您还没有掌握任何单词。"));

  h.server.post("/review/toggle").await;
  h.server
    .post("/sentence")
    .form(&[("sentence", "good a0")])
    .await;
  h.server.post("/advance").await;
  h.server.post("/review/toggle").await;

  let page = h.server.get("/").await.text();
  assert!(page.contains("已掌握的单词"));
  assert!(page.contains("good a0"));
  assert!(page.contains("掌握时间："));

  h.server.post("/review/toggle").await;
  assert_eq!(state(&h.server).await["currentIndex"], 1);
}

#[tokio::test]
async fn test_return_home_requires_confirmation() {
  let h = harness(false, false);

  let redirect = h.server.get("/home").await;
  redirect.assert_status(StatusCode::SEE_OTHER);

  start(&h.server).await;
  let confirm = h.server.get("/home").await;
  confirm.assert_status_ok();
  assert!(confirm.text().contains("确定要返回首页重新选择学段吗？"));

  h.server.post("/home").form(&[("confirm", "no")]).await;
  assert_eq!(state(&h.server).await["screen"], "learning");

  h.server
    .post("/home")
    .form(&[("confirm", "yes")])
    .await
    .assert_status(StatusCode::SEE_OTHER);
  let snapshot = state(&h.server).await;
  assert_eq!(snapshot["screen"], "onboarding");
  assert_eq!(snapshot["level"], Value::Null);
  assert!(snapshot["wordQueue"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_sessions_are_separate_but_share_mastered_list() {
  let mut h = harness(false, false);
  start(&h.server).await;
  h.server
    .post("/sentence")
    .form(&[("sentence", "good a0")])
    .await;
  h.server.post("/advance").await;

  // A different browser
  h.server.clear_cookies();
  let snapshot = state(&h.server).await;
  assert_eq!(snapshot["screen"], "onboarding");
  assert_eq!(snapshot["masteredItems"][0]["word"], "a0");
}

#[tokio::test]
async fn test_concurrent_browsers_keep_each_others_mastery() {
  let h = harness(false, false);
  let other = h.second_browser();
  h.server.get("/").await.assert_status_ok();
  other.get("/").await.assert_status_ok();

  start(&h.server).await;
  h.server
    .post("/sentence")
    .form(&[("sentence", "good a0")])
    .await;
  h.server.post("/advance").await;

  // The second browser was already open before a0 was mastered
  start(&other).await;
  assert_eq!(h.exclusions.lock().unwrap()[1], vec!["a0".to_string()]);
  assert_eq!(state(&other).await["currentWord"]["word"], "b0");
  other
    .post("/sentence")
    .form(&[("sentence", "good b0")])
    .await;
  other.post("/advance").await;

  let stored: Vec<String> = h
    .repository
    .load()
    .unwrap()
    .iter()
    .map(|m| m.word().to_string())
    .collect();
  assert_eq!(stored, vec!["b0", "a0"]);

  let mine = state(&h.server).await;
  let theirs = state(&other).await;
  assert_eq!(theirs["masteredItems"].as_array().unwrap().len(), 2);
  assert_eq!(theirs["masteredItems"][0]["word"], "b0");
  assert_eq!(mine["masteredItems"].as_array().unwrap().len(), 2);
  assert_eq!(mine["currentIndex"], 1);
}

#[tokio::test]
async fn test_static_stylesheet_served() {
  let h = harness(false, false);
  let css = h.server.get("/static/css/app.css").await;
  css.assert_status_ok();
  assert!(css.text().contains(".word-card"));
}
