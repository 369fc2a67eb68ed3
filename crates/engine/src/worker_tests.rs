// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{model, Harness, BUCKET};
use parking_lot::Mutex;
use std::sync::Arc;
use tfr_core::{OperationStatus, ResourceModel};
use proptest::prelude::*;
use yare::parameterized;

tfr_core::step_sequence! {
    pub enum ToyStep {
        One => "TOY_ONE",
        Two => "TOY_TWO",
        Three => "TOY_THREE",
    }
}

/// Operation whose step bodies are scripted per test.
#[derive(Clone)]
struct Toy {
    script: Arc<Mutex<Vec<Result<Transition<ToyStep>, HandlerFailure>>>>,
    seen: Arc<Mutex<Vec<ToyStep>>>,
}

impl Toy {
    fn new(script: Vec<Result<Transition<ToyStep>, HandlerFailure>>) -> Self {
        Self { script: Arc::new(Mutex::new(script)), seen: Arc::new(Mutex::new(Vec::new())) }
    }

    fn seen(&self) -> Vec<ToyStep> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Operation for Toy {
    type Step = ToyStep;

    fn kind(&self) -> OperationKind {
        OperationKind::Update
    }

    async fn run_step(
        &self,
        step: ToyStep,
        _worker: &mut Worker<'_>,
    ) -> Result<Transition<ToyStep>, HandlerFailure> {
        self.seen.lock().push(step);
        let mut script = self.script.lock();
        if script.is_empty() {
            return Ok(Transition::Repeat);
        }
        script.remove(0)
    }
}

fn at(step: &str) -> Option<OperationContext> {
    Some(Harness::context_at(step))
}

#[tokio::test]
async fn fresh_context_starts_at_first_step() {
    let h = Harness::new();
    let toy = Toy::new(vec![Ok(Transition::Advance(ToyStep::Two))]);

    let event = invoke(&toy, &h.deps, model(), None).await;

    assert_eq!(toy.seen(), vec![ToyStep::One]);
    let ctx = event.callback_context.unwrap();
    assert_eq!(ctx.step_id.as_deref(), Some("TOY_TWO"));
    assert_eq!(event.callback_delay_seconds, Some(0));
}

#[tokio::test]
async fn existing_request_id_is_kept_on_fresh_start() {
    let h = Harness::new();
    let toy = Toy::new(vec![]);
    let context =
        OperationContext { command_request_id: Some("keep01".into()), ..OperationContext::default() };

    let event = invoke(&toy, &h.deps, model(), Some(context)).await;

    let ctx = event.callback_context.unwrap();
    assert_eq!(ctx.command_request_id.as_deref(), Some("keep01"));
    assert!(h.user_log("keep01").contains("Beginning command requested update on r1"));
}

#[tokio::test]
async fn repeat_backs_off_on_same_step() {
    let h = Harness::new();
    let toy = Toy::new(vec![]);

    let mut delays = Vec::new();
    let mut context = at("TOY_TWO");
    for _ in 0..5 {
        let event = invoke(&toy, &h.deps, model(), context.take()).await;
        delays.push(event.callback_delay_seconds.unwrap());
        assert_eq!(event.message.as_deref(), Some("Step: TOY_TWO"));
        context = event.callback_context;
    }

    assert_eq!(delays, vec![0, 1, 2, 4, 8]);
}

#[tokio::test]
async fn advancing_resets_backoff() {
    let h = Harness::new();
    let toy = Toy::new(vec![Ok(Transition::Advance(ToyStep::Three))]);
    let context = OperationContext { last_delay_seconds: 8, ..Harness::context_at("TOY_TWO") };

    let event = invoke(&toy, &h.deps, model(), Some(context)).await;

    assert_eq!(event.callback_delay_seconds, Some(0));
    assert_eq!(event.callback_context.unwrap().last_delay_seconds, 0);
}

#[parameterized(
    same = { ToyStep::Two },
    earlier = { ToyStep::One },
)]
#[test_macro(tokio::test)]
async fn moving_backwards_is_unhandled(target: ToyStep) {
    let h = Harness::new();
    let toy = Toy::new(vec![Ok(Transition::Advance(target))]);

    let event = invoke(&toy, &h.deps, model(), at("TOY_TWO")).await;

    assert_eq!(event.status, OperationStatus::Failed);
    assert_eq!(
        event.message.unwrap(),
        format!("TOY_TWO: cannot move from step TOY_TWO back to {target}")
    );
}

#[tokio::test]
async fn handled_failure_message_is_passed_through() {
    let h = Harness::new();
    let toy = Toy::new(vec![Err(HandlerFailure::handled("bad configuration"))]);

    let event = invoke(&toy, &h.deps, model(), at("TOY_ONE")).await;

    assert_eq!(event.status, OperationStatus::Failed);
    assert_eq!(event.message.as_deref(), Some("bad configuration"));
    assert!(event.callback_context.is_none());
    assert!(h.user_log("abc123").contains("FAILING: bad configuration"));
}

#[tokio::test]
async fn unhandled_failure_logs_cause_chain() {
    let h = Harness::new();
    let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
    let toy = Toy::new(vec![Err(HandlerFailure::unhandled_with("upload broke", cause))]);

    let event = invoke(&toy, &h.deps, model(), at("TOY_THREE")).await;

    assert_eq!(event.message.as_deref(), Some("TOY_THREE: upload broke"));
    let log = h.user_log("abc123");
    assert!(log.contains("FAILING: TOY_THREE: upload broke\n  caused by: disk on fire"), "{log}");
}

#[tokio::test]
async fn unknown_step_name_fails_before_running_anything() {
    let h = Harness::new();
    let toy = Toy::new(vec![]);

    let event = invoke(&toy, &h.deps, model(), at("TOY_FOUR")).await;

    assert_eq!(event.status, OperationStatus::Failed);
    assert_eq!(event.message.as_deref(), Some("invalid step: TOY_FOUR"));
    assert!(toy.seen().is_empty());
}

#[tokio::test]
async fn succeed_drops_context_and_logs() {
    let h = Harness::new();
    let toy = Toy::new(vec![Ok(Transition::Succeed)]);

    let event = invoke(&toy, &h.deps, model(), at("TOY_THREE")).await;

    assert_eq!(event.status, OperationStatus::Success);
    assert!(event.callback_context.is_none());
    assert!(event.message.is_none());
    assert!(h.user_log("abc123").ends_with("SUCCESS: r1\n"));
}

#[tokio::test]
async fn log_bucket_is_remembered_from_model() {
    let h = Harness::new();
    let toy = Toy::new(vec![]);

    let event = invoke(&toy, &h.deps, model(), None).await;

    assert_eq!(event.callback_context.unwrap().log_bucket_name.as_deref(), Some(BUCKET));
}

#[tokio::test]
async fn log_bucket_is_restored_onto_model_from_context() {
    let h = Harness::new();
    let toy = Toy::new(vec![]);
    let bare = ResourceModel { log_bucket_url: None, ..model() };

    let event = invoke(&toy, &h.deps, bare, at("TOY_TWO")).await;

    assert_eq!(event.resource_model.log_bucket_name().as_deref(), Some(BUCKET));
}

#[tokio::test]
async fn no_log_bucket_means_no_user_log() {
    let h = Harness::new();
    let toy = Toy::new(vec![Err(HandlerFailure::handled("nope"))]);
    let bare = ResourceModel { log_bucket_url: None, ..model() };

    let event = invoke(&toy, &h.deps, bare, None).await;

    assert_eq!(event.status, OperationStatus::Failed);
    assert!(h.objects.keys(BUCKET).is_empty());
}

#[tokio::test]
async fn missing_identifier_is_unhandled() {
    let h = Harness::new();
    let toy = Toy::new(vec![]);
    let anonymous = ResourceModel { identifier: None, ..model() };

    let event = invoke(&toy, &h.deps, anonymous, at("TOY_ONE")).await;

    assert_eq!(event.message.as_deref(), Some("TOY_ONE: resource model has no identifier"));
    assert!(toy.seen().is_empty());
}

#[tokio::test]
async fn process_manager_defaults_to_nohup_and_is_pinned() {
    let h = Harness::new();
    let mut worker = Worker {
        deps: &h.deps,
        model: model(),
        context: OperationContext::default(),
    };

    assert_eq!(worker.process_manager().await.unwrap(), ProcessManager::Nohup);
    h.params.set("process-manager", "systemd");
    assert_eq!(worker.process_manager().await.unwrap(), ProcessManager::Nohup);
    assert_eq!(worker.context.process_manager, Some(ProcessManager::Nohup));
}

#[tokio::test]
async fn upload_uses_request_id_in_scratch_file_name() {
    let h = Harness::new();
    h.remote.on_stdout("file --brief", "text/plain");
    let worker = Worker {
        deps: &h.deps,
        model: model(),
        context: Harness::context_at("TOY_ONE"),
    };

    worker.upload_configuration(true).await.unwrap();

    let uploads = h.remote.uploads();
    assert_eq!(uploads.len(), 1);
    let (dir, name, contents) = &uploads[0];
    assert_eq!(dir, "/tmp/r1");
    assert!(name.starts_with("terraform-upload-abc123-"), "{name}");
    assert_eq!(contents.as_slice(), model().configuration_content.unwrap().as_bytes());
}

fn scripted_transition() -> impl Strategy<Value = Transition<ToyStep>> {
    prop_oneof![
        Just(Transition::Repeat),
        proptest::sample::select(ToyStep::ALL).prop_map(Transition::Advance),
    ]
}

proptest! {
    #[test]
    fn persisted_step_never_moves_backwards(
        script in proptest::collection::vec(scripted_transition(), 1..12),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let h = Harness::new();
        let toy = Toy::new(script.iter().copied().map(Ok).collect());

        let mut positions = vec![ToyStep::One.position()];
        let mut context = None;
        for transition in &script {
            let current = ToyStep::ALL[*positions.last().unwrap()];
            let event = rt.block_on(invoke(&toy, &h.deps, model(), context.take()));

            if let Transition::Advance(next) = transition {
                if !current.precedes(next) {
                    prop_assert_eq!(event.status, OperationStatus::Failed);
                    prop_assert!(event.callback_context.is_none());
                    break;
                }
            }
            prop_assert_eq!(event.status, OperationStatus::InProgress);
            let ctx = event.callback_context.clone().unwrap();
            let step: ToyStep = ctx.step_id.as_deref().unwrap().parse().unwrap();
            prop_assert!(step.position() >= *positions.last().unwrap(), "{:?}", positions);
            positions.push(step.position());
            context = Some(ctx);
        }

        prop_assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(toy.seen().first().copied(), Some(ToyStep::One));
    }
}
