mod common;

use std::sync::Arc;

use budget_tracker::{
    auth::{AuthProvider, LocalAuthProvider},
    config::Config,
    core::{
        palette,
        services::{
            BudgetService, CategoryForm, ExpenseForm, ExpenseService, OnboardingDraft,
            OnboardingService, ServiceContext, UserService,
        },
        time::FixedClock,
        timeframe::Timeframe,
    },
    state::AppState,
    storage::JsonFileStore,
};
use common::{june, setup_test_env, Fixture};

#[test]
fn config_round_trips_through_manager() {
    let (manager, base) = setup_test_env();
    assert_eq!(manager.load().expect("defaults"), Config::default());

    let config = Config {
        currency: "€".into(),
        recent_expense_limit: 3,
        default_timeframe: Timeframe::Week,
        ..Config::default()
    };
    manager.save(&config).expect("save");
    assert_eq!(manager.base_dir(), base.as_path());
    assert!(manager.path().starts_with(&base));
    assert_eq!(manager.load().expect("reload"), config);
    assert_eq!(manager.data_file(&config), base.join("data.json"));
}

#[test]
fn invalid_config_is_not_written() {
    let (manager, _) = setup_test_env();
    let config = Config {
        recent_expense_limit: 0,
        ..Config::default()
    };
    assert!(manager.save(&config).is_err());
    assert!(!manager.path().exists());
}

#[tokio::test]
async fn json_store_keeps_data_between_sessions() {
    let (manager, _) = setup_test_env();
    let path = manager.data_file(&Config::default());
    let user = uuid::Uuid::new_v4();
    let clock = Arc::new(FixedClock(june(13, 12, 0)));

    {
        let store = Arc::new(JsonFileStore::open(&path).expect("open"));
        let ctx = ServiceContext::with_clock(store, clock.clone(), user);
        let food = BudgetService::new(ctx.clone())
            .add_category(CategoryForm::new("Food", "250").with_icon("🍔"))
            .await
            .expect("category");
        ExpenseService::new(ctx)
            .add_expense(ExpenseForm::new("19.90", food.id).described("Groceries"))
            .await
            .expect("expense");
    }

    let store = Arc::new(JsonFileStore::open(&path).expect("reopen"));
    let ctx = ServiceContext::with_clock(store, clock, user);
    let summary = BudgetService::new(ctx.clone())
        .budget_summary()
        .await
        .expect("summary");
    assert_eq!(summary.total_budget, 250.0);
    assert_eq!(summary.total_spent, 19.9);

    let expenses = ExpenseService::new(ctx).expenses().await.expect("expenses");
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].description, "Groceries");
    assert_eq!(expenses[0].category_icon, "🍔");
}

#[tokio::test]
async fn accounts_survive_provider_restart() {
    let (manager, _) = setup_test_env();
    let path = manager.accounts_file();
    let created = LocalAuthProvider::open(&path)
        .expect("open")
        .sign_up("ana@example.com", "secret1", "Ana")
        .await
        .expect("sign up");

    let reopened = LocalAuthProvider::open(&path).expect("reopen");
    assert!(reopened.current_session().await.is_none());
    let session = reopened
        .sign_in("ana@example.com", "secret1")
        .await
        .expect("sign in");
    assert_eq!(session.user_id, created.user_id);
}

#[tokio::test]
async fn onboarding_creates_profile_and_categories() {
    let fx = Fixture::at(june(13, 12, 0));
    let state = AppState::new(5);

    let mut draft = OnboardingDraft::new();
    draft.monthly_income = "4200".into();
    draft.savings_goal = "600".into();
    draft.toggle(palette::preset("Housing").expect("preset"));
    draft.toggle(palette::preset("Food").expect("preset"));
    draft.add_custom("Pets").expect("custom");
    draft.set_budget("Housing", "1500");
    draft.set_budget("Food", "not a number");
    draft.set_budget("Pets", "-20");

    let outcome = OnboardingService::new(fx.ctx.clone())
        .complete(&draft, &state)
        .await
        .expect("complete");
    assert!(outcome.profile.is_onboarded);
    assert_eq!(outcome.profile.monthly_income, Some(4200.0));
    assert_eq!(outcome.profile.savings_goal, Some(600.0));
    assert!(state.auth().is_onboarded);

    let budgets: Vec<(String, f64)> = outcome
        .categories
        .iter()
        .map(|c| (c.name.clone(), c.monthly_budget))
        .collect();
    assert_eq!(
        budgets,
        vec![
            ("Housing".to_string(), 1500.0),
            ("Food".to_string(), 0.0),
            ("Pets".to_string(), 0.0),
        ]
    );
    let pets = &outcome.categories[2];
    assert_eq!(
        pets.color,
        palette::color_for_index(palette::DEFAULT_CATEGORIES.len() + 2)
    );

    let profile = UserService::new(fx.ctx.clone())
        .profile()
        .await
        .unwrap()
        .expect("stored profile");
    assert_eq!(profile, outcome.profile);
}

#[tokio::test]
async fn onboarding_without_categories_saves_nothing() {
    let fx = Fixture::at(june(13, 12, 0));
    let state = AppState::new(5);
    let mut draft = OnboardingDraft::new();
    draft.monthly_income = "4200".into();
    draft.savings_goal = "600".into();

    let err = OnboardingService::new(fx.ctx.clone())
        .complete(&draft, &state)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please select at least one category");
    assert!(fx.store.snapshot().await.profiles.is_empty());
    assert!(!state.auth().is_onboarded);
}
