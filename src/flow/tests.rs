#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::error::{ResearchError, ServiceErrorKind};
    use crate::flow::{
        QUERY_REQUIRED, RequestOutcome, ResearchCategory, ResearchFlowController,
        SELECTION_REQUIRED,
    };
    use crate::service::testing::{
        CHAT, FakeService, IMAGES, RECOMMENDATIONS, STATUS, SUMMARIES, sample_article,
    };
    use crate::types::FlowStep;

    fn create_controller() -> (ResearchFlowController, Arc<FakeService>) {
        let service = Arc::new(FakeService::new());
        let controller = ResearchFlowController::new(service.clone());
        (controller, service)
    }

    async fn wait_until_in_flight(service: &FakeService, count: usize) {
        while service.in_flight() < count {
            tokio::task::yield_now().await;
        }
    }

    fn server_error() -> ResearchError {
        ResearchError::from_status(500, "Error generating summaries")
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (controller, _service) = create_controller();
        let state = controller.snapshot().await;

        assert_eq!(state.current_step, FlowStep::Query);
        assert!(state.recommendations.is_empty());
        assert!(state.selection.is_empty());
        assert!(state.summaries.is_none());
        assert!(state.chat_history.is_empty());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_set_query_trims() {
        let (controller, service) = create_controller();
        controller.set_query("  bone density  ").await;

        assert_eq!(controller.snapshot().await.research_query, "bone density");
        assert_eq!(service.calls(RECOMMENDATIONS), 0);
    }

    #[tokio::test]
    async fn test_get_recommendations_success() {
        let (controller, service) = create_controller();
        let outcome = controller
            .get_recommendations(" microgravity plant growth ", 5)
            .await
            .unwrap();

        assert_eq!(outcome, RequestOutcome::Applied);
        let state = controller.snapshot().await;
        assert_eq!(state.current_step, FlowStep::Recommendations);
        assert_eq!(state.research_query, "microgravity plant growth");
        assert_eq!(state.recommendations.len(), 5);
        assert!(state.recommendations.iter().all(|a| !a.selected));
        assert!(state.selection.is_empty());
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(service.calls(RECOMMENDATIONS), 1);
    }

    #[tokio::test]
    async fn test_get_recommendations_rejects_blank_query() {
        let (controller, service) = create_controller();
        let err = controller.get_recommendations("   ", 5).await.unwrap_err();

        assert_eq!(err, ResearchError::validation(QUERY_REQUIRED));
        assert_eq!(service.calls(RECOMMENDATIONS), 0);
        let state = controller.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(QUERY_REQUIRED));
        assert_eq!(state.current_step, FlowStep::Query);
    }

    #[tokio::test]
    async fn test_get_recommendations_failure_keeps_step() {
        let (controller, service) = create_controller();
        service.fail_on(
            RECOMMENDATIONS,
            1,
            ResearchError::from_status(503, "No analyzed articles available"),
        );

        let err = controller
            .get_recommendations("microgravity", 5)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResearchError::Service {
                kind: ServiceErrorKind::Unavailable,
                ..
            }
        ));

        let state = controller.snapshot().await;
        assert_eq!(state.current_step, FlowStep::Query);
        assert!(!state.loading);
        assert_eq!(state.error, Some(err.user_message()));

        // 重试时清除旧的错误
        controller.get_recommendations("microgravity", 5).await.unwrap();
        assert!(controller.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_new_recommendations_replace_selection_and_summaries() {
        let (controller, _service) = create_controller();
        controller.get_recommendations("plants", 5).await.unwrap();
        controller.select_article("a1").await;
        controller.request_summaries().await.unwrap();

        controller.get_recommendations("radiation", 3).await.unwrap();
        let state = controller.snapshot().await;
        assert_eq!(state.recommendations.len(), 3);
        assert!(state.selection.is_empty());
        assert!(state.summaries.is_none());
        assert_eq!(state.current_step, FlowStep::Recommendations);
    }

    #[tokio::test]
    async fn test_select_then_deselect_round_trip() {
        let (controller, _service) = create_controller();
        controller.get_recommendations("plants", 5).await.unwrap();
        controller.select_article("a2").await;
        let before = controller.snapshot().await.selection;

        for id in ["a1", "a3", "a5"] {
            assert!(controller.select_article(id).await);
            assert!(controller.deselect_article(id).await);
            let state = controller.snapshot().await;
            assert_eq!(state.selection, before);
            assert!(state.selection_consistent());
        }
    }

    #[tokio::test]
    async fn test_select_is_idempotent() {
        let (controller, _service) = create_controller();
        controller.get_recommendations("plants", 5).await.unwrap();

        assert!(controller.select_article("a1").await);
        assert!(!controller.select_article("a1").await);
        let state = controller.snapshot().await;
        assert_eq!(state.selection.ids(), ["a1".to_string()]);
        assert!(state.selection_consistent());

        assert!(!controller.deselect_article("a4").await);
        assert!(!controller.select_article("missing").await);
        assert_eq!(controller.snapshot().await.selection.len(), 1);
        assert_eq!(
            controller.current_step().await,
            FlowStep::Recommendations
        );
    }

    #[tokio::test]
    async fn test_clear_selections() {
        let (controller, _service) = create_controller();
        controller.get_recommendations("plants", 5).await.unwrap();
        controller.select_article("a1").await;
        controller.select_article("a2").await;
        controller.clear_selections().await;

        let state = controller.snapshot().await;
        assert!(state.selection.is_empty());
        assert!(state.recommendations.iter().all(|a| !a.selected));
    }

    #[tokio::test]
    async fn test_get_summaries_validation_never_reaches_network() {
        let (controller, service) = create_controller();
        let article = sample_article("a1", "plants");

        let err = controller.get_summaries(&[], "").await.unwrap_err();
        assert!(err.is_validation());

        let err = controller
            .get_summaries(std::slice::from_ref(&article), "   ")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Research query is required");

        let err = controller.get_summaries(&[], "plants").await.unwrap_err();
        assert_eq!(err, ResearchError::validation(SELECTION_REQUIRED));

        assert_eq!(service.calls(SUMMARIES), 0);
        assert!(!controller.is_loading().await);
    }

    #[tokio::test]
    async fn test_get_summaries_missing_query_does_not_set_loading() {
        let (controller, service) = create_controller();
        let article = sample_article("a1", "plants");

        let err = controller.get_summaries(&[article], "").await.unwrap_err();
        assert_eq!(err.to_string(), "Research query is required");

        let state = controller.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Research query is required"));
        assert_eq!(service.calls(SUMMARIES), 0);
    }

    #[tokio::test]
    async fn test_summaries_scenario() {
        let (controller, service) = create_controller();
        let query = "microgravity plant growth";
        controller.get_recommendations(query, 5).await.unwrap();
        assert_eq!(controller.snapshot().await.recommendations.len(), 5);

        controller.select_article("a1").await;
        controller.select_article("a3").await;
        let selected = controller.snapshot().await.selected_articles();
        assert_eq!(selected.len(), 2);

        let outcome = controller.get_summaries(&selected, query).await.unwrap();
        assert_eq!(outcome, RequestOutcome::Applied);

        let state = controller.snapshot().await;
        assert_eq!(state.current_step, FlowStep::Summaries);
        let bundle = state.summaries.as_ref().unwrap();
        assert_eq!(bundle.article_summaries.len(), 2);
        assert_eq!(state.suggested_questions().len(), 2);
        assert_eq!(
            bundle.combined_summary.as_deref(),
            Some("Combined view on microgravity plant growth")
        );
        assert_eq!(service.calls(SUMMARIES), 1);
    }

    #[tokio::test]
    async fn test_summaries_failure_keeps_step() {
        let (controller, service) = create_controller();
        controller.get_recommendations("plants", 5).await.unwrap();
        controller.select_article("a1").await;
        service.fail_on(SUMMARIES, 1, server_error());

        assert!(controller.request_summaries().await.is_err());
        let state = controller.snapshot().await;
        assert_eq!(state.current_step, FlowStep::Recommendations);
        assert!(state.summaries.is_none());
        assert!(!state.loading);
        assert!(state.error.as_deref().unwrap().contains("internal error"));
    }

    #[tokio::test]
    async fn test_chat_appends_confirmed_history() {
        let (controller, service) = create_controller();
        controller.get_recommendations("plants", 5).await.unwrap();
        controller.select_article("a1").await;
        controller.request_summaries().await.unwrap();

        controller.ask("What are the main findings?").await.unwrap();
        let state = controller.snapshot().await;
        assert_eq!(state.current_step, FlowStep::Chat);
        assert_eq!(state.chat_history.len(), 2);
        assert_eq!(state.chat_history[0].content, "What are the main findings?");
        assert_eq!(state.follow_up_questions.len(), 1);

        controller.ask("Which organisms?").await.unwrap();
        let state = controller.snapshot().await;
        assert_eq!(state.chat_history.len(), 4);
        assert_eq!(state.chat_history[1].content, "Answer to: What are the main findings?");
        assert_eq!(service.calls(CHAT), 2);
    }

    #[tokio::test]
    async fn test_chat_blank_question_rejected() {
        let (controller, service) = create_controller();
        let err = controller.send_chat_message(" ", &[], "plants", &[]).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(service.calls(CHAT), 0);
    }

    #[tokio::test]
    async fn test_chat_failure_keeps_history() {
        let (controller, service) = create_controller();
        controller.get_recommendations("plants", 5).await.unwrap();
        controller.select_article("a1").await;
        controller.request_summaries().await.unwrap();
        service.fail_on(
            CHAT,
            1,
            ResearchError::Network {
                message: "connection refused".to_string(),
                timed_out: false,
            },
        );

        assert!(controller.ask("Why?").await.is_err());
        let state = controller.snapshot().await;
        assert_eq!(state.current_step, FlowStep::Summaries);
        assert!(state.chat_history.is_empty());
        assert!(state.error.as_deref().unwrap().starts_with("Unable to reach"));
    }

    #[tokio::test]
    async fn test_reset_after_chat_preserves_status() {
        let (controller, _service) = create_controller();
        let status = controller.load_status().await.unwrap();

        controller.get_recommendations("plants", 5).await.unwrap();
        controller.select_article("a1").await;
        controller.request_summaries().await.unwrap();
        controller.ask("What are the main findings?").await.unwrap();
        assert_eq!(controller.current_step().await, FlowStep::Chat);

        controller.reset_flow().await;
        let state = controller.snapshot().await;
        assert_eq!(state.current_step, FlowStep::Query);
        assert!(state.research_query.is_empty());
        assert!(state.recommendations.is_empty());
        assert!(state.selection.is_empty());
        assert!(state.summaries.is_none());
        assert!(state.chat_history.is_empty());
        assert!(state.follow_up_questions.is_empty());
        assert_eq!(state.system_status, Some(status));
    }

    #[tokio::test]
    async fn test_status_failure_is_swallowed() {
        let (controller, service) = create_controller();
        service.fail_on(
            STATUS,
            1,
            ResearchError::Network {
                message: "refused".to_string(),
                timed_out: false,
            },
        );

        assert!(controller.load_status().await.is_none());
        let state = controller.snapshot().await;
        assert!(state.error.is_none());
        assert!(state.system_status.is_none());

        controller.get_recommendations("plants", 5).await.unwrap();
        assert_eq!(controller.current_step().await, FlowStep::Recommendations);
    }

    #[tokio::test]
    async fn test_stale_recommendations_discarded() {
        let (controller, service) = create_controller();
        let gate = service.gate_on(RECOMMENDATIONS, 1);

        let slow = controller.clone();
        let first =
            tokio::spawn(async move { slow.get_recommendations("first topic", 5).await });
        wait_until_in_flight(&service, 1).await;

        let outcome = controller.get_recommendations("second topic", 3).await.unwrap();
        assert_eq!(outcome, RequestOutcome::Applied);

        gate.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome, RequestOutcome::Discarded);

        let state = controller.snapshot().await;
        assert_eq!(state.research_query, "second topic");
        assert_eq!(state.recommendations.len(), 3);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_chat() {
        let (controller, service) = create_controller();
        controller.get_recommendations("plants", 5).await.unwrap();
        controller.select_article("a1").await;
        let gate = service.gate_on(CHAT, 1);

        let asking = controller.clone();
        let pending = tokio::spawn(async move { asking.ask("Why?").await });
        wait_until_in_flight(&service, 1).await;

        controller.reset_flow().await;
        gate.notify_one();

        assert_eq!(pending.await.unwrap().unwrap(), RequestOutcome::Discarded);
        let state = controller.snapshot().await;
        assert_eq!(state.current_step, FlowStep::Query);
        assert!(state.chat_history.is_empty());
    }

    #[tokio::test]
    async fn test_chat_reply_for_previous_topic_discarded() {
        let (controller, service) = create_controller();
        controller.get_recommendations("plants", 5).await.unwrap();
        controller.select_article("a1").await;
        controller.request_summaries().await.unwrap();
        let gate = service.gate_on(CHAT, 1);

        let asking = controller.clone();
        let pending = tokio::spawn(async move { asking.ask("old topic question").await });
        wait_until_in_flight(&service, 1).await;

        controller.get_recommendations("space radiation", 5).await.unwrap();
        gate.notify_one();

        assert_eq!(pending.await.unwrap().unwrap(), RequestOutcome::Discarded);
        let state = controller.snapshot().await;
        assert_eq!(state.research_query, "space radiation");
        assert_eq!(state.current_step, FlowStep::Recommendations);
        assert!(state.chat_history.is_empty());
        assert!(state.follow_up_questions.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_cancel_loading_still_applies_response() {
        let (controller, service) = create_controller();
        let gate = service.gate_on(RECOMMENDATIONS, 1);

        let slow = controller.clone();
        let request = tokio::spawn(async move { slow.get_recommendations("plants", 5).await });
        wait_until_in_flight(&service, 1).await;
        assert!(controller.is_loading().await);

        controller.cancel_loading().await;
        assert!(!controller.is_loading().await);

        gate.notify_one();
        assert_eq!(request.await.unwrap().unwrap(), RequestOutcome::Applied);
        assert_eq!(controller.snapshot().await.recommendations.len(), 5);
    }

    #[tokio::test]
    async fn test_query_images_are_best_effort() {
        let (controller, service) = create_controller();
        controller.get_recommendations("plants", 5).await.unwrap();

        assert_eq!(controller.fetch_query_images().await, 5);
        assert_eq!(controller.snapshot().await.query_images.len(), 5);

        service.fail_on(IMAGES, 2, server_error());
        assert_eq!(controller.fetch_query_images().await, 0);
        let state = controller.snapshot().await;
        assert!(state.error.is_none());
        assert_eq!(state.current_step, FlowStep::Recommendations);
    }

    #[tokio::test]
    async fn test_query_images_skipped_without_query() {
        let (controller, service) = create_controller();
        assert_eq!(controller.fetch_query_images().await, 0);
        assert_eq!(service.calls(IMAGES), 0);
    }

    #[tokio::test]
    async fn test_next_step_and_go_back() {
        let (controller, _service) = create_controller();
        controller.next_step(FlowStep::Chat).await;
        assert_eq!(controller.current_step().await, FlowStep::Chat);

        controller.go_back().await;
        assert_eq!(controller.current_step().await, FlowStep::Recommendations);
    }

    #[tokio::test]
    async fn test_apply_category() {
        let (controller, _service) = create_controller();
        controller
            .apply_category(ResearchCategory::Radiation, 4)
            .await
            .unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.research_query, ResearchCategory::Radiation.query());
        assert_eq!(state.recommendations.len(), 4);
    }
}
