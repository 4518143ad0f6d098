//! Repository integration tests against in-memory SQLite.
//!
//! Covers the CRUD surface: natural-key uniqueness, referential deletion
//! guards, case-insensitive search, and the agent↔province assignment
//! workflow. The delivery transaction flow has its own suite in
//! `delivery_workflow.rs`.

use caravan_core::{Agent, StatsPeriod};
use caravan_db::error::DbError;
use caravan_db::repository::agent::{NewAgent, UpdateAgent};
use caravan_db::repository::customer::{NewCustomer, UpdateCustomer};
use caravan_db::repository::delivery::{NewDelivery, NewDeliveryItem};
use caravan_db::{Database, DbConfig};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

async fn make_agent(db: &Database, name: &str, rate_bps: u32) -> Agent {
    db.agents()
        .create(&NewAgent {
            name: name.to_string(),
            phone: "+93 70 000 0000".to_string(),
            email: Some(format!("{}@caravan.example", name.to_lowercase())),
            commission_rate_bps: rate_bps,
        })
        .await
        .expect("create agent")
}

/// One-line-item delivery used to arm the referential guards.
fn one_box(
    customer_id: Option<String>,
    agent_id: Option<String>,
    province_id: Option<String>,
) -> NewDelivery {
    NewDelivery {
        customer_id,
        agent_id,
        province_id,
        delivery_date: None,
        status: None,
        items: vec![NewDeliveryItem {
            item_name: "Box".to_string(),
            description: None,
            unit_cost_cents: 5000,
            selling_price_cents: None,
            quantity: 1,
        }],
    }
}

// =============================================================================
// Provinces
// =============================================================================

#[tokio::test]
async fn list_is_idempotent_without_writes() {
    let db = test_db().await;

    db.provinces().create("Kabul").await.unwrap();
    db.provinces().create("Herat").await.unwrap();

    let first: Vec<String> = db
        .provinces()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    let second: Vec<String> = db
        .provinces()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();

    assert_eq!(first, second);
    assert_eq!(first, vec!["Herat".to_string(), "Kabul".to_string()]);
}

#[tokio::test]
async fn duplicate_province_name_rejected() {
    let db = test_db().await;

    db.provinces().create("Kabul").await.unwrap();

    let err = db.provinces().create("Kabul").await.unwrap_err();
    assert!(matches!(err, DbError::DuplicateName { .. }));

    // The natural-key check is case-sensitive
    db.provinces().create("kabul").await.unwrap();

    // A different name is fine
    let herat = db.provinces().create("Herat").await.unwrap();

    // Renaming onto an existing name is rejected...
    let err = db.provinces().update(&herat.id, "Kabul").await.unwrap_err();
    assert!(matches!(err, DbError::DuplicateName { .. }));

    // ...but re-saving your own name is not a conflict
    let affected = db.provinces().update(&herat.id, "Herat").await.unwrap();
    assert_eq!(affected, 1);
}

#[tokio::test]
async fn province_update_missing_id_is_not_found() {
    let db = test_db().await;

    let err = db
        .provinces()
        .update("no-such-id", "Ghor")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
async fn province_delete_guards_name_each_dependent_type() {
    let db = test_db().await;

    let kabul = db.provinces().create("Kabul").await.unwrap();
    let agent = make_agent(&db, "Ahmad", 1500).await;
    db.agents()
        .assign_province(&agent.id, &kabul.id)
        .await
        .unwrap();
    let customer = db
        .customers()
        .create(&NewCustomer {
            name: "Hamid Traders".to_string(),
            email: None,
            phone: None,
            address: None,
            province_id: Some(kabul.id.clone()),
        })
        .await
        .unwrap();
    let delivery = db
        .deliveries()
        .create(&one_box(None, None, Some(kabul.id.clone())))
        .await
        .unwrap();

    // Deliveries block first
    let err = db.provinces().delete(&kabul.id).await.unwrap_err();
    assert!(err.to_string().contains("deliveries"));

    db.deliveries().delete(&delivery.delivery_id).await.unwrap();

    // Then agent assignments
    let err = db.provinces().delete(&kabul.id).await.unwrap_err();
    assert!(err.to_string().contains("agents"));

    db.agents()
        .unassign_province(&agent.id, &kabul.id)
        .await
        .unwrap();

    // Then customers
    let err = db.provinces().delete(&kabul.id).await.unwrap_err();
    assert!(err.to_string().contains("customers"));

    db.customers().delete(&customer.id).await.unwrap();

    // With every dependent gone the delete goes through
    db.provinces().delete(&kabul.id).await.unwrap();
    assert!(db.provinces().get_by_id(&kabul.id).await.unwrap().is_none());
}

#[tokio::test]
async fn province_search_is_case_insensitive_and_empty_lists_all() {
    let db = test_db().await;

    db.provinces().create("Kabul").await.unwrap();
    db.provinces().create("Kandahar").await.unwrap();
    db.provinces().create("Herat").await.unwrap();

    let hits = db.provinces().search("ka").await.unwrap();
    assert_eq!(hits.len(), 2);

    let hits = db.provinces().search("KA").await.unwrap();
    assert_eq!(hits.len(), 2);

    let all = db.provinces().search("").await.unwrap();
    assert_eq!(all.len(), 3);

    let none = db.provinces().search("zzz").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn province_stats_report_zero_for_empty_provinces() {
    let db = test_db().await;

    let kabul = db.provinces().create("Kabul").await.unwrap();
    db.provinces().create("Herat").await.unwrap();

    db.deliveries()
        .create(&NewDelivery {
            province_id: Some(kabul.id.clone()),
            items: vec![
                NewDeliveryItem {
                    item_name: "Box".to_string(),
                    description: None,
                    unit_cost_cents: 1000,
                    selling_price_cents: None,
                    quantity: 3,
                },
                NewDeliveryItem {
                    item_name: "Crate".to_string(),
                    description: None,
                    unit_cost_cents: 2000,
                    selling_price_cents: None,
                    quantity: 2,
                },
            ],
            ..Default::default()
        })
        .await
        .unwrap();

    let stats = db.provinces().list_with_stats().await.unwrap();
    assert_eq!(stats.len(), 2);

    let herat = stats.iter().find(|s| s.name == "Herat").unwrap();
    assert_eq!(herat.total_deliveries, 0);
    assert_eq!(herat.total_items, 0);

    let kabul_stats = stats.iter().find(|s| s.name == "Kabul").unwrap();
    assert_eq!(kabul_stats.total_deliveries, 1);
    assert_eq!(kabul_stats.total_items, 5);
}

// =============================================================================
// Agents
// =============================================================================

#[tokio::test]
async fn duplicate_agent_name_rejected() {
    let db = test_db().await;

    make_agent(&db, "Ahmad", 1500).await;

    let err = db
        .agents()
        .create(&NewAgent {
            name: "Ahmad".to_string(),
            phone: "+93 70 111 1111".to_string(),
            email: None,
            commission_rate_bps: 1000,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::DuplicateName { .. }));

    let farid = make_agent(&db, "Farid", 1000).await;

    let err = db
        .agents()
        .update(&UpdateAgent {
            id: farid.id.clone(),
            name: "Ahmad".to_string(),
            phone: farid.phone.clone(),
            email: farid.email.clone(),
            commission_rate_bps: farid.commission_rate_bps,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::DuplicateName { .. }));
}

#[tokio::test]
async fn agent_delete_guarded_by_deliveries_then_sweeps_assignments() {
    let db = test_db().await;

    let kabul = db.provinces().create("Kabul").await.unwrap();
    let agent = make_agent(&db, "Ahmad", 1500).await;
    db.agents()
        .assign_province(&agent.id, &kabul.id)
        .await
        .unwrap();

    let delivery = db
        .deliveries()
        .create(&one_box(None, Some(agent.id.clone()), None))
        .await
        .unwrap();

    let err = db.agents().delete(&agent.id).await.unwrap_err();
    assert!(matches!(err, DbError::ReferentialIntegrity { .. }));
    assert!(err.to_string().contains("deliveries"));

    db.deliveries().delete(&delivery.delivery_id).await.unwrap();

    // Assignment rows go with the agent
    db.agents().delete(&agent.id).await.unwrap();
    assert!(db.agents().get_by_id(&agent.id).await.unwrap().is_none());

    // The province is now free of agent references
    db.provinces().delete(&kabul.id).await.unwrap();
}

#[tokio::test]
async fn agent_search_matches_name_email_and_phone() {
    let db = test_db().await;

    make_agent(&db, "Ahmad Rahimi", 1500).await;
    db.agents()
        .create(&NewAgent {
            name: "Farid Noori".to_string(),
            phone: "+93 79 555 7777".to_string(),
            email: Some("farid@pamir.example".to_string()),
            commission_rate_bps: 800,
        })
        .await
        .unwrap();

    assert_eq!(db.agents().search("rahimi").await.unwrap().len(), 1);
    assert_eq!(db.agents().search("pamir").await.unwrap().len(), 1);
    assert_eq!(db.agents().search("555 7777").await.unwrap().len(), 1);
    assert_eq!(db.agents().search("").await.unwrap().len(), 2);
}

#[tokio::test]
async fn agent_overview_rolls_up_deliveries_and_assignments() {
    let db = test_db().await;

    let kabul = db.provinces().create("Kabul").await.unwrap();
    let herat = db.provinces().create("Herat").await.unwrap();
    let agent = make_agent(&db, "Ahmad", 1000).await; // 10%

    db.agents()
        .assign_province(&agent.id, &kabul.id)
        .await
        .unwrap();
    db.agents()
        .assign_province(&agent.id, &herat.id)
        .await
        .unwrap();

    // Two deliveries at 10_000 cost each → 1_000 commission each
    for _ in 0..2 {
        db.deliveries()
            .create(&NewDelivery {
                agent_id: Some(agent.id.clone()),
                items: vec![NewDeliveryItem {
                    item_name: "Box".to_string(),
                    description: None,
                    unit_cost_cents: 10_000,
                    selling_price_cents: None,
                    quantity: 1,
                }],
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let overview = db.agents().list_with_stats().await.unwrap();
    assert_eq!(overview.len(), 1);
    let row = &overview[0];
    assert_eq!(row.total_deliveries, 2);
    assert_eq!(row.total_commission_cents, 2_000);
    assert_eq!(row.assigned_provinces_count, 2);
    let joined = row.assigned_provinces.as_deref().unwrap();
    assert!(joined.contains("Kabul") && joined.contains("Herat"));
}

#[tokio::test]
async fn assignment_workflow() {
    let db = test_db().await;

    let kabul = db.provinces().create("Kabul").await.unwrap();
    let herat = db.provinces().create("Herat").await.unwrap();
    let balkh = db.provinces().create("Balkh").await.unwrap();
    let agent = make_agent(&db, "Ahmad", 1500).await;

    db.agents()
        .assign_province(&agent.id, &kabul.id)
        .await
        .unwrap();

    // Assigning the same pair again is a business error
    let err = db
        .agents()
        .assign_province(&agent.id, &kabul.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::AlreadyAssigned));

    // The picker only offers what is not yet assigned
    let available: Vec<String> = db
        .agents()
        .available_provinces(&agent.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(available, vec!["Balkh".to_string(), "Herat".to_string()]);

    // Removal is guarded by deliveries the agent carried into the province
    let delivery = db
        .deliveries()
        .create(&one_box(
            None,
            Some(agent.id.clone()),
            Some(kabul.id.clone()),
        ))
        .await
        .unwrap();

    let err = db
        .agents()
        .unassign_province(&agent.id, &kabul.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ReferentialIntegrity { .. }));

    db.deliveries().delete(&delivery.delivery_id).await.unwrap();
    db.agents()
        .unassign_province(&agent.id, &kabul.id)
        .await
        .unwrap();

    // Bulk assignment replaces the whole set
    db.agents()
        .bulk_assign_provinces(&agent.id, &[herat.id.clone(), balkh.id.clone()])
        .await
        .unwrap();
    let assigned: Vec<String> = db
        .agents()
        .provinces(&agent.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(assigned, vec!["Balkh".to_string(), "Herat".to_string()]);

    db.agents()
        .bulk_assign_provinces(&agent.id, &[kabul.id.clone()])
        .await
        .unwrap();
    let assigned: Vec<String> = db
        .agents()
        .provinces(&agent.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(assigned, vec!["Kabul".to_string()]);

    let counts = db.agents().list_with_province_count().await.unwrap();
    assert_eq!(counts[0].province_count, 1);
}

#[tokio::test]
async fn agent_performance_windows() {
    let db = test_db().await;

    let agent = make_agent(&db, "Ahmad", 1000).await; // 10%

    // One delivery dated today, one from years back
    db.deliveries()
        .create(&NewDelivery {
            agent_id: Some(agent.id.clone()),
            items: vec![NewDeliveryItem {
                item_name: "Box".to_string(),
                description: None,
                unit_cost_cents: 10_000,
                selling_price_cents: None,
                quantity: 2,
            }],
            ..Default::default()
        })
        .await
        .unwrap();

    db.deliveries()
        .create(&NewDelivery {
            agent_id: Some(agent.id.clone()),
            delivery_date: Some("2020-01-01".parse().unwrap()),
            items: vec![NewDeliveryItem {
                item_name: "Crate".to_string(),
                description: None,
                unit_cost_cents: 5_000,
                selling_price_cents: None,
                quantity: 1,
            }],
            ..Default::default()
        })
        .await
        .unwrap();

    let recent = db
        .agents()
        .performance(&agent.id, StatsPeriod::Week)
        .await
        .unwrap();
    assert_eq!(recent.delivery_count, 1);
    assert_eq!(recent.item_count, 2);
    assert_eq!(recent.commission_earned_cents, 2_000);

    let all_time = db
        .agents()
        .performance(&agent.id, StatsPeriod::AllTime)
        .await
        .unwrap();
    assert_eq!(all_time.delivery_count, 2);
    assert_eq!(all_time.item_count, 3);
    assert_eq!(all_time.commission_earned_cents, 2_500);
    assert_eq!(all_time.max_commission_cents, Some(2_000));
    assert_eq!(all_time.min_commission_cents, Some(500));
}

// =============================================================================
// Customers
// =============================================================================

#[tokio::test]
async fn customer_crud_and_shared_names() {
    let db = test_db().await;

    let kabul = db.provinces().create("Kabul").await.unwrap();

    let first = db
        .customers()
        .create(&NewCustomer {
            name: "Hamid Traders".to_string(),
            email: Some("orders@hamid.example".to_string()),
            phone: Some("+93 78 000 0001".to_string()),
            address: Some("Shop 4, Main Bazaar".to_string()),
            province_id: Some(kabul.id.clone()),
        })
        .await
        .unwrap();

    // Customer names are not natural keys - a second "Hamid Traders" is fine
    db.customers()
        .create(&NewCustomer {
            name: "Hamid Traders".to_string(),
            email: None,
            phone: None,
            address: None,
            province_id: None,
        })
        .await
        .unwrap();

    let listed = db.customers().list().await.unwrap();
    assert_eq!(listed.len(), 2);
    let with_province = listed
        .iter()
        .find(|c| c.id == first.id)
        .expect("first customer listed");
    assert_eq!(with_province.province_name.as_deref(), Some("Kabul"));

    let affected = db
        .customers()
        .update(&UpdateCustomer {
            id: first.id.clone(),
            name: "Hamid & Sons".to_string(),
            email: first.email.clone(),
            phone: first.phone.clone(),
            address: first.address.clone(),
            province_id: first.province_id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let reloaded = db.customers().get_by_id(&first.id).await.unwrap().unwrap();
    assert_eq!(reloaded.name, "Hamid & Sons");

    assert_eq!(db.customers().search("sons").await.unwrap().len(), 1);
    assert_eq!(db.customers().search("").await.unwrap().len(), 2);
}

#[tokio::test]
async fn customer_delete_guarded_by_deliveries() {
    let db = test_db().await;

    let customer = db
        .customers()
        .create(&NewCustomer {
            name: "Ariana Bazaar".to_string(),
            email: None,
            phone: None,
            address: None,
            province_id: None,
        })
        .await
        .unwrap();

    let delivery = db
        .deliveries()
        .create(&one_box(Some(customer.id.clone()), None, None))
        .await
        .unwrap();

    let err = db.customers().delete(&customer.id).await.unwrap_err();
    assert!(matches!(err, DbError::ReferentialIntegrity { .. }));
    assert!(err.to_string().contains("deliveries"));

    // Removing the dependent delivery unblocks the delete
    db.deliveries().delete(&delivery.delivery_id).await.unwrap();
    db.customers().delete(&customer.id).await.unwrap();
    assert!(db
        .customers()
        .get_by_id(&customer.id)
        .await
        .unwrap()
        .is_none());
}
