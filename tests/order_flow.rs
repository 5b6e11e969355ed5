mod common;

use bonus_backend::entities::{OrderStatus, TransactionKind, order_entity as orders};
use bonus_backend::error::AppError;
use bonus_backend::models::{BonusSettings, CreateOrderRequest, OrderQuery, RewardItem};
use bonus_backend::entities::DiscountType;
use common::*;
use sea_orm::EntityTrait;

#[tokio::test]
async fn test_first_order_earns_base_rate() {
    let (db, services) = setup().await;

    let created = services
        .orders
        .create_order("alice", order_of(1000, None))
        .await
        .unwrap();

    assert_eq!(created.bonus_earned, 50);
    assert_eq!(created.bonus_used, 0);
    assert_eq!(created.new_balance, 50);
    assert_eq!(cached_balance(&db, "alice").await, Some(50));
    assert_eq!(services.bonus.total_orders("alice").await.unwrap(), 1);

    let entries = ledger_for(&db, "alice").await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, TransactionKind::Earned);
    assert_eq!(entries[0].amount, 50);
    assert_eq!(entries[0].order_id, Some(created.order_id));
}

#[tokio::test]
async fn test_order_with_bonus_used_writes_both_entries() {
    let (db, services) = setup().await;
    services
        .orders
        .create_order("bob", order_of(1000, None))
        .await
        .unwrap();

    let created = services
        .orders
        .create_order("bob", order_of(600, Some(30)))
        .await
        .unwrap();

    // 600 * 5% = 30
    assert_eq!(created.bonus_earned, 30);
    assert_eq!(created.new_balance, 50);
    assert_eq!(services.bonus.reconcile("bob").await, 50);

    let entries = ledger_for(&db, "bob").await;
    assert_eq!(entries.len(), 3);
    let spent: Vec<_> = entries
        .iter()
        .filter(|e| e.kind == TransactionKind::Spent)
        .collect();
    assert_eq!(spent.len(), 1);
    assert_eq!(spent[0].amount, 30);
    assert_eq!(spent[0].balance_after, 20);
}

#[tokio::test]
async fn test_bonus_used_above_balance_is_rejected() {
    let (db, services) = setup().await;
    services
        .orders
        .create_order("carol", order_of(1000, None))
        .await
        .unwrap();

    let err = services
        .orders
        .create_order("carol", order_of(1000, Some(80)))
        .await
        .unwrap_err();
    match err {
        AppError::InsufficientBalance {
            required,
            available,
        } => {
            assert_eq!(required, 80);
            assert_eq!(available, 50);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(cached_balance(&db, "carol").await, Some(50));
    assert_eq!(orders::Entity::find().all(&db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_mismatched_amount_is_rejected_without_side_effects() {
    let (db, services) = setup().await;

    let request = CreateOrderRequest {
        user_id: None,
        items: vec![item("Latte", 350, 2), item("Cookie", 150, 1)],
        amount: 900,
        bonus_used: None,
    };
    let err = services
        .orders
        .create_order("dave", request)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(orders::Entity::find().all(&db).await.unwrap().is_empty());
    assert_eq!(cached_balance(&db, "dave").await, None);
}

#[tokio::test]
async fn test_tier_multiplier_applies_after_ten_orders() {
    let (_db, services) = setup().await;
    for _ in 0..10 {
        services
            .orders
            .create_order("erin", order_of(1000, None))
            .await
            .unwrap();
    }

    // 第 11 单时累计 10 单，等级为 Enthusiast (x1.2)
    let created = services
        .orders
        .create_order("erin", order_of(1000, None))
        .await
        .unwrap();
    assert_eq!(created.bonus_earned, 60);
    assert_eq!(created.new_balance, 10 * 50 + 60);
}

#[tokio::test]
async fn test_category_multiplier_applies_when_items_share_category() {
    let (_db, services) = setup().await;
    let mut settings = BonusSettings::default();
    settings.category_multipliers.insert("pastry".to_string(), 2.0);
    settings.rewards = vec![RewardItem {
        id: "free-cookie".to_string(),
        name: "Free cookie".to_string(),
        description: String::new(),
        cost: 40,
        discount_type: DiscountType::Fixed,
        discount: 150,
        is_active: true,
    }];
    services.settings.replace_settings(settings).await.unwrap();

    let mut croissant = item("Croissant", 500, 2);
    croissant.category = Some("pastry".to_string());
    let mut cookie = item("Cookie", 500, 2);
    cookie.category = Some("pastry".to_string());

    let created = services
        .orders
        .create_order(
            "frank",
            CreateOrderRequest {
                user_id: None,
                items: vec![croissant, cookie],
                amount: 2000,
                bonus_used: None,
            },
        )
        .await
        .unwrap();
    // 2000 * 5% * 2
    assert_eq!(created.bonus_earned, 200);
}

#[tokio::test]
async fn test_status_lifecycle() {
    let (_db, services) = setup().await;
    let created = services
        .orders
        .create_order("gina", order_of(400, None))
        .await
        .unwrap();
    let id = created.order_id;

    for status in [
        OrderStatus::Accepted,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ] {
        let order = services.orders.update_status(id, status).await.unwrap();
        assert_eq!(order.status, status);
    }

    let err = services
        .orders
        .update_status(id, OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(
        services.orders.get_order(id).await.unwrap().status,
        OrderStatus::Completed
    );
}

#[tokio::test]
async fn test_skipping_a_status_leaves_order_unchanged() {
    let (_db, services) = setup().await;
    let id = services
        .orders
        .create_order("hank", order_of(400, None))
        .await
        .unwrap()
        .order_id;

    let err = services
        .orders
        .update_status(id, OrderStatus::Ready)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(
        services.orders.get_order(id).await.unwrap().status,
        OrderStatus::Pending
    );

    // 状态流转不产生积分流水
    services
        .orders
        .update_status(id, OrderStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(services.bonus.reconcile("hank").await, 20);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let (_db, services) = setup().await;
    let err = services
        .orders
        .update_status(404, OrderStatus::Accepted)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_list_orders_filters_and_includes_items() {
    let (_db, services) = setup().await;
    let first = services
        .orders
        .create_order(
            "ivy",
            CreateOrderRequest {
                user_id: None,
                items: vec![item("Latte", 350, 2), item("Cookie", 150, 1)],
                amount: 850,
                bonus_used: None,
            },
        )
        .await
        .unwrap();
    let second = services
        .orders
        .create_order("ivy", order_of(300, None))
        .await
        .unwrap();
    services
        .orders
        .create_order("jack", order_of(300, None))
        .await
        .unwrap();
    services
        .orders
        .update_status(first.order_id, OrderStatus::Accepted)
        .await
        .unwrap();

    let all_ivy = services
        .orders
        .list_orders(&OrderQuery {
            user_id: Some("ivy".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all_ivy.len(), 2);
    assert_eq!(all_ivy[0].id, second.order_id);
    assert_eq!(all_ivy[1].items.len(), 2);
    assert_eq!(all_ivy[1].items[0].name, "Latte");

    let accepted = services
        .orders
        .list_orders(&OrderQuery {
            status: Some(OrderStatus::Accepted),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].id, first.order_id);

    let everyone = services
        .orders
        .list_orders(&OrderQuery::default())
        .await
        .unwrap();
    assert_eq!(everyone.len(), 3);
}

#[tokio::test]
async fn test_concurrent_orders_spending_full_balance() {
    let (db, services) = setup().await;
    let funded = services
        .orders
        .create_order("kate", order_of(2000, None))
        .await
        .unwrap();
    assert_eq!(funded.new_balance, 100);

    let (a, b) = tokio::join!(
        services.orders.create_order("kate", order_of(200, Some(100))),
        services.orders.create_order("kate", order_of(200, Some(100))),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(
        r,
        Err(AppError::InsufficientBalance {
            required: 100,
            ..
        })
    )));

    // 200 * 5% = 10，只有一单抵扣成功
    assert_eq!(services.bonus.reconcile("kate").await, 10);
    assert_eq!(cached_balance(&db, "kate").await, Some(10));
    assert_eq!(orders::Entity::find().all(&db).await.unwrap().len(), 2);
    let spent_total: i64 = ledger_for(&db, "kate")
        .await
        .iter()
        .filter(|e| e.kind == TransactionKind::Spent)
        .map(|e| e.amount)
        .sum();
    assert_eq!(spent_total, 100);
}
