//! Integration tests for contact resolution
//!
//! Covers:
//! - End-to-end resolution scenarios against small rosters
//! - Matching, fallback and ranking properties (proptest)
//! - Concurrent resolution over a shared engine
//! - Intent handler flows over the sample roster
//! - Configuration, contact files and metrics wiring

use contact_resolution::contracts::PersonHandle;
use contact_resolution::engine::{evaluate, ranking, MatchField, MatchVerdict};
use contact_resolution::intents::{
    ResponseCode, SearchForMessagesIntent, SendMessageIntent, SetMessageAttributeIntent,
    ValueResolution,
};
use contact_resolution::{
    ContactStore, DisambiguationKind, IntentDispatcher, IntentHandler, IntentKind, MessageLog,
    Person, PersonResolution, PhoneNumber, ResolutionEngine, ResolutionMetricsRegistry,
    ResolutionOutcome, ResolutionRequest, ResolverConfig, User,
};
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

fn evans(favorite: bool) -> User {
    User::new("Evans")
        .with_given_name("Evans")
        .with_family_name("Reily")
        .favorite(favorite)
}

fn jane_doe(phones: &[(&str, &str)]) -> User {
    phones.iter().fold(
        User::new("jdoe").with_given_name("Jane").with_family_name("Doe"),
        |user, (label, number)| user.with_phone_number(PhoneNumber::new(*label, *number)),
    )
}

// Scenarios

#[test]
fn test_screen_name_match_needs_confirmation() {
    let engine = ResolutionEngine::new(ContactStore::new(vec![evans(false)]));
    let query = User::new("Evans");

    let ranked = engine.rank_users(&query);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].score, 1);
    assert!(!ranked[0].is_confident());

    assert_eq!(
        engine.resolve_person(&query, true),
        ResolutionOutcome::ConfirmationRequired(evans(false))
    );
}

#[test]
fn test_favorite_with_matching_given_name_succeeds() {
    let engine = ResolutionEngine::new(ContactStore::new(vec![evans(true)]));
    let query = User::new("Evans").with_given_name("Evans");

    let ranked = engine.rank_users(&query);
    assert!(ranked[0].is_confident());

    match engine.resolve_person(&query, true) {
        ResolutionOutcome::Success(user) => assert_eq!(user.screen_name, "Evans"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_one_candidate_with_two_numbers_offers_numbers() {
    let store = ContactStore::new(vec![jane_doe(&[
        ("mobile", "555-0100"),
        ("work", "555-0199"),
    ])]);
    let engine = ResolutionEngine::new(store);
    let query = User::new("").with_given_name("Jane").with_family_name("Doe");

    match engine.resolve_person(&query, true) {
        ResolutionOutcome::Disambiguation { kind, options } => {
            assert_eq!(kind, DisambiguationKind::PhoneNumber);
            let numbers: Vec<_> = options.iter().map(|u| u.screen_name.as_str()).collect();
            assert_eq!(numbers, vec!["555-0100", "555-0199"]);
            assert!(options.iter().all(|u| u.phone_numbers.len() == 1));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_two_same_named_users_are_both_offered() {
    let store = ContactStore::new(vec![
        jane_doe(&[("mobile", "555-0100")]),
        jane_doe(&[("mobile", "555-0199")]),
    ]);
    // Name-only identity: the two records compare equal
    assert_eq!(store.users()[0], store.users()[1]);

    let engine = ResolutionEngine::new(store);
    let query = User::new("").with_given_name("Jane").with_family_name("Doe");
    match engine.resolve_person(&query, true) {
        ResolutionOutcome::Disambiguation { kind, options } => {
            assert_eq!(kind, DisambiguationKind::Person);
            assert_eq!(options.len(), 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_partial_matches_are_capped_at_five() {
    let users: Vec<User> = (0..7)
        .map(|i| {
            User::new(format!("doe{}", i))
                .with_given_name("Ann")
                .favorite(i == 4)
        })
        .collect();
    let store = ContactStore::new(users);
    let query = User::new("doe").with_given_name("Zed");

    let match_set = store.find_all(&query);
    assert!(match_set.used_fallback);
    assert_eq!(match_set.users.len(), 7);

    let engine = ResolutionEngine::new(store);
    let ranked = engine.rank_users(&query);
    assert_eq!(ranked.len(), 7);
    assert_eq!(ranked[0].user.screen_name, "doe4");
    assert!(ranked.iter().all(|c| c.is_partial_match_set));

    match engine.resolve_person(&query, true) {
        ResolutionOutcome::Disambiguation { kind, options } => {
            assert_eq!(kind, DisambiguationKind::Person);
            let names: Vec<_> = options.iter().map(|u| u.screen_name.as_str()).collect();
            assert_eq!(names, vec!["doe4", "doe0", "doe1", "doe2", "doe3"]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_unknown_person_is_unsupported() {
    let engine = ResolutionEngine::new(ContactStore::sample().unwrap());
    let query = User::new("zz-nobody").with_given_name("Quincy");
    assert_eq!(engine.resolve_person(&query, true), ResolutionOutcome::Unsupported);
}

#[test]
fn test_phone_handle_bypasses_ranking() {
    let engine = ResolutionEngine::new(ContactStore::sample().unwrap());
    let phone = PhoneNumber::new("mobile", "555-0100");
    let request = ResolutionRequest::new(User::new("").with_given_name("Nobody"))
        .with_handle(PersonHandle::phone(&phone));
    assert!(engine.resolve(&request).is_success());
}

// Properties

fn name_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[abAB]{0,2}")
}

fn user_strategy() -> impl Strategy<Value = User> {
    ("[abAB]{0,3}", name_strategy(), name_strategy(), any::<bool>()).prop_map(
        |(screen_name, given, family, favorite)| User {
            screen_name,
            given_name: given,
            family_name: family,
            is_favorite: favorite,
            phone_numbers: Vec::new(),
        },
    )
}

proptest! {
    #[test]
    fn prop_evaluate_reports_fields_in_order(
        query in user_strategy(),
        candidate in user_strategy(),
    ) {
        let report = evaluate(&query, &candidate);
        prop_assert_eq!(report.verdicts().len(), 3);
        for (index, field) in MatchField::ALL.iter().enumerate() {
            prop_assert_eq!(report.verdicts()[index], report.verdict(*field));
        }
        let screen = MatchField::ScreenName.comparison().compare(
            Some(query.screen_name.as_str()),
            Some(candidate.screen_name.as_str()),
        );
        prop_assert_eq!(report.verdict(MatchField::ScreenName), screen);
    }

    #[test]
    fn prop_full_match_iff_no_mismatch(query in user_strategy(), candidate in user_strategy()) {
        let report = evaluate(&query, &candidate);
        let has_mismatch = report.verdicts().iter().any(|v| *v == MatchVerdict::Mismatch);
        prop_assert_eq!(report.is_full_match(), !has_mismatch);
    }

    #[test]
    fn prop_find_all_prefers_exact(
        users in prop::collection::vec(user_strategy(), 0..10),
        query in user_strategy(),
    ) {
        let store = ContactStore::new(users);
        let exact = store.find_exact(&query);
        let partial = store.find_partial(&query);
        let all = store.find_all(&query);

        if !exact.is_empty() {
            prop_assert!(!all.used_fallback);
            prop_assert_eq!(all.users.len(), exact.len());
        }
        if !partial.is_empty() {
            prop_assert!(!all.users.is_empty());
        }
    }

    #[test]
    fn prop_rank_is_sorted_and_stable(
        users in prop::collection::vec(user_strategy(), 0..10),
        query in user_strategy(),
    ) {
        // Tag screen names with the store position so ties can be traced back
        let users: Vec<User> = users
            .into_iter()
            .enumerate()
            .map(|(index, mut user)| {
                user.screen_name = format!("{}#{}", user.screen_name, index);
                user
            })
            .collect();
        let store = ContactStore::new(users);
        let ranked = ranking::rank(&store, &query);
        let position = |user: &User| {
            store
                .users()
                .iter()
                .position(|u| u.screen_name == user.screen_name)
        };

        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(position(&pair[0].user) < position(&pair[1].user));
            }
        }
    }

    #[test]
    fn prop_disambiguation_is_bounded(
        users in prop::collection::vec(user_strategy(), 0..12),
        query in user_strategy(),
    ) {
        let engine = ResolutionEngine::new(ContactStore::new(users));
        let outcome = engine.resolve_person(&query, true);
        if let ResolutionOutcome::Disambiguation { kind, options } = outcome {
            prop_assert_eq!(kind, DisambiguationKind::Person);
            prop_assert!((2..=5).contains(&options.len()));
        }
    }
}

// Concurrency

#[test]
fn test_concurrent_resolution_shares_one_engine() {
    let registry = ResolutionMetricsRegistry::new().unwrap();
    let metrics = registry.resolution();
    let engine = ResolutionEngine::new(ContactStore::sample().unwrap())
        .with_metrics(Arc::clone(&metrics));

    let queries = [
        User::new("Evans"),
        User::new("").with_given_name("Jane").with_family_name("Appleseed"),
        User::new("nobody-at-all").with_given_name("Quincy"),
        User::new("doe"),
    ];
    let expected: Vec<_> = queries
        .iter()
        .map(|q| engine.resolve_person(q, true).label())
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for (query, label) in queries.iter().zip(&expected) {
                    assert_eq!(engine.resolve_person(query, true).label(), *label);
                }
            });
        }
    });

    let total: u64 = ["success", "confirmation_required", "disambiguation", "unsupported"]
        .iter()
        .map(|outcome| metrics.outcome_count(outcome))
        .sum();
    assert_eq!(total, 20);
}

// Intent flows

fn dispatcher(signed_in: bool) -> IntentDispatcher {
    let store = ContactStore::sample().unwrap();
    let current_user = if signed_in {
        store.find_by_screen_name("Evans").cloned()
    } else {
        None
    };
    let log = MessageLog::in_memory().with_current_user(current_user);
    IntentDispatcher::new(ResolutionEngine::new(store), log)
}

#[test]
fn test_send_message_flow() {
    let dispatcher = dispatcher(true);
    let IntentHandler::SendMessage(handler) = dispatcher.handler_for(IntentKind::SendMessage) else {
        panic!("expected a send message handler");
    };

    assert_eq!(
        handler.resolve_content(Some("See you at 6")),
        ValueResolution::Success("See you at 6".to_string())
    );

    // Jane has two numbers, so the host is asked to pick one
    let recipients = vec![Person::named("Jane Appleseed")];
    let options = match &handler.resolve_recipients(Some(recipients.as_slice()))[..] {
        [PersonResolution::Disambiguation(options)] => options.clone(),
        other => panic!("unexpected resolutions: {:?}", other),
    };
    assert_eq!(options.len(), 2);

    let chosen = options[1].clone();
    assert_eq!(
        handler.resolve_recipients(Some(std::slice::from_ref(&chosen))),
        vec![PersonResolution::Success(chosen.clone())]
    );

    let intent = SendMessageIntent::new("See you at 6", vec![chosen]);
    assert_eq!(handler.confirm(&intent).code, ResponseCode::Ready);
    assert_eq!(handler.handle(&intent).unwrap().code, ResponseCode::Success);

    let history = dispatcher.message_log().load_history().unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[3].recipients[0].formatted_name(), "Jane Appleseed");
}

#[test]
fn test_send_message_requires_login() {
    let dispatcher = dispatcher(false);
    let IntentHandler::SendMessage(handler) = dispatcher.handler_for(IntentKind::SendMessage) else {
        panic!("expected a send message handler");
    };
    let intent = SendMessageIntent::new("Hi", vec![Person::named("Jane Appleseed")]);
    assert_eq!(
        handler.confirm(&intent).code,
        ResponseCode::FailureRequiringAppLaunch
    );
}

#[test]
fn test_search_for_messages_flow() {
    let dispatcher = dispatcher(true);
    let IntentHandler::SearchForMessages(handler) =
        dispatcher.handler_for(IntentKind::SearchForMessages)
    else {
        panic!("expected a search handler");
    };

    let senders = vec![Person::named("John Doe")];
    let resolutions = handler.resolve_senders(Some(senders.as_slice()));
    assert!(resolutions[0].is_success());

    let response = handler
        .handle(&SearchForMessagesIntent::from_senders(senders))
        .unwrap();
    let contents: Vec<_> = response.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["Hello", "Hi", "How are you?"]);
}

#[test]
fn test_set_attribute_flow() {
    let dispatcher = dispatcher(true);
    let IntentHandler::SetMessageAttribute(handler) =
        dispatcher.handler_for(IntentKind::SetMessageAttribute)
    else {
        panic!("expected a set attribute handler");
    };
    let intent = SetMessageAttributeIntent::default();
    assert!(matches!(
        handler.resolve_attribute(&intent),
        ValueResolution::Success(_)
    ));
    assert_eq!(handler.handle(&intent).code, ResponseCode::Success);
}

// Configuration and files

#[test]
fn test_config_loads_contact_file_and_history() {
    let dir = TempDir::new().unwrap();
    let contacts = dir.path().join("friends.yaml");
    std::fs::write(
        &contacts,
        concat!(
            "friends:\n",
            "  - fullName: Evans Reily\n",
            "    screenName: Evans\n",
            "  - fullName: Mia Wong\n",
            "    screenName: mia\n",
            "    isFavorite: true\n",
        ),
    )
    .unwrap();
    let history = dir.path().join("history.json");

    let config = ResolverConfig::builder()
        .contacts_path(&contacts)
        .history_path(&history)
        .current_user("Evans")
        .history_limit(3)
        .build();

    let engine = config.build_engine(None).unwrap();
    assert_eq!(engine.store().len(), 2);

    let log = config.build_message_log(engine.store()).unwrap();
    let dispatcher = IntentDispatcher::new(engine, log);
    let IntentHandler::SendMessage(handler) = dispatcher.handler_for(IntentKind::SendMessage) else {
        panic!("expected a send message handler");
    };
    let intent = SendMessageIntent::new("Hi Mia", vec![Person::named("Mia Wong")]);
    assert_eq!(handler.handle(&intent).unwrap().code, ResponseCode::Success);

    // Seed plus one message, trimmed to the limit and persisted
    let reopened = MessageLog::with_file(&history);
    let saved = reopened.load_history().unwrap();
    assert_eq!(saved.len(), 3);
    assert_eq!(saved[2].content, "Hi Mia");
}

#[test]
fn test_missing_contact_file_is_a_file_error() {
    let config = ResolverConfig::builder()
        .contacts_path("/nonexistent/friends.json")
        .build();
    let err = config.build_engine(None).unwrap_err();
    assert!(matches!(err, contact_resolution::ResolutionError::FileError(_)));
}
