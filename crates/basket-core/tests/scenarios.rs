//! End-to-end parsing scenarios over in-memory workbooks.

use std::collections::BTreeMap;
use std::str::FromStr;

use basket_core::models::spec::{NetworkPortGroup, StorageSlot};
use basket_core::{
    augment_specification, BasketConfig, BasketMeta, BasketParser, Category, Cell, ConsolidatedSpecification, DiagnosticKind,
    Extension, InferenceRules, Sheet, SpecFragment, SupportOption, Workbook,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn row(cells: &[&str]) -> Vec<Cell> {
    cells.iter().map(|s| Cell::from(*s)).collect()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn dell_rows(with_lot_b: bool) -> Vec<Vec<Cell>> {
    let mut rows = vec![
        row(&["Dell Technologies - Server Basket Q3 2025"]),
        row(&[]),
        row(&[]),
        row(&[
            "Lot Description",
            "Item",
            "Specification",
            "List Price",
            "Net Price USD",
            "Net Price EUR",
            "3Y ProSupport USD",
        ]),
        vec![
            "Lot A".into(),
            "Processor".into(),
            "1 x 4309Y".into(),
            Cell::Number(12000.0),
            Cell::Number(9500.0),
            Cell::Number(8800.0),
            Cell::Number(1200.0),
        ],
        row(&["", "Memory", "32GB (2x 16GB)"]),
        row(&["", "Storage", "8 x 2.5\""]),
    ];
    if with_lot_b {
        rows.push(vec![
            "Lot B".into(),
            "Processor".into(),
            "2 x 6430".into(),
            Cell::Number(30000.0),
            Cell::Number(24000.0),
        ]);
        rows.push(row(&["", "Network", "2 x 25GbE SFP28"]));
    }
    rows
}

fn dell_workbook(with_lot_b: bool) -> Workbook {
    Workbook::new(vec![
        Sheet::new("Cover", vec![row(&["Quote"])]),
        Sheet::new("Dell Lot Pricing", dell_rows(with_lot_b)),
    ])
}

fn dell_meta() -> BasketMeta {
    BasketMeta::new("Dell")
        .with_basket_id("dell-q3")
        .with_period(3, 2025)
        .with_filename("dell_q3_2025.xlsx")
}

fn lenovo_workbook() -> Workbook {
    Workbook::new(vec![
        Sheet::new(
            "Lenovo X86 Server Lots",
            vec![
                row(&["Lenovo Server Basket"]),
                row(&[]),
                row(&[]),
                row(&["", "Part Number", "Description", "Qty", "Net Price USD", "Net Price EUR"]),
                vec![
                    Cell::Empty,
                    Cell::Empty,
                    "SMI1 : ThinkSystem SR630 V3 - 1yr Warranty".into(),
                    Cell::Empty,
                    Cell::Number(5000.0),
                    Cell::Number(4600.0),
                ],
                row(&["", "4XG7A83799", "Intel Xeon Silver 4410T 10C 150W 2.7GHz Processor", "1", "", ""]),
                row(&["", "4ZC7A08709", "ThinkSystem 32GB TruDDR5 4800MHz (2Rx8) RDIMM", "4", "", ""]),
            ],
        ),
        Sheet::new(
            "Lenovo X86 Parts",
            vec![
                row(&["Part Number", "Description", "Price in $", "Price in €"]),
                row(&["4ZC7A08709", "ThinkSystem 32GB TruDDR5 4800MHz (2Rx8) RDIMM", "410", "380"]),
            ],
        ),
    ])
}

#[test]
fn test_dell_lot_is_flushed_before_next_lot() {
    let parser = BasketParser::default();
    let outcome = parser.parse(&dell_workbook(true), &dell_meta()).unwrap();

    assert_eq!(outcome.models.len(), 2);
    let lot_a = outcome.model_by_lot("Lot A").unwrap();
    assert_eq!(lot_a.source_row, 5);
    assert_eq!(lot_a.vendor_id, "dell");
    assert_eq!(lot_a.category, "server");

    let processor = lot_a.specification.processor.clone().unwrap();
    assert_eq!(processor.count, 1);
    assert_eq!(processor.model, "4309Y");

    let memory = lot_a.specification.memory.clone().unwrap();
    assert_eq!(memory.total_capacity, "32GB");
    assert_eq!(memory.module_count, 2);
    assert_eq!(memory.module_capacity.as_deref(), Some("16GB"));

    assert_eq!(
        lot_a.specification.storage.clone().unwrap().slots,
        vec![StorageSlot {
            count: 8,
            size: Some("2.5\"".to_string()),
            interface: None,
            capacity: None,
        }]
    );

    let categories: Vec<Category> = outcome.configurations_of(&lot_a.id).map(|c| c.category).collect();
    assert_eq!(categories, vec![Category::Processor, Category::Memory, Category::Storage]);

    let lot_b = outcome.model_by_lot("Lot B").unwrap();
    assert_eq!(lot_b.specification.processor.clone().unwrap().count, 2);
    assert_eq!(
        lot_b.specification.network.clone().unwrap().ports,
        vec![NetworkPortGroup {
            count: 2,
            speed: Some("25GbE".to_string()),
            port_type: Some("SFP28".to_string()),
        }]
    );
    assert!(lot_b.specification.memory.is_none());
}

#[test]
fn test_dell_pricing_from_headers() {
    let parser = BasketParser::default();
    let outcome = parser.parse(&dell_workbook(true), &dell_meta()).unwrap();
    let lot_a = outcome.model_by_lot("Lot A").unwrap();
    let pricing = outcome.pricing_of(&lot_a.id).unwrap();

    assert_eq!(pricing.currency, "USD");
    assert_eq!(pricing.list_price, Some(dec("12000")));
    assert_eq!(pricing.net_price("USD"), Some(dec("9500")));
    assert_eq!(pricing.net_price("EUR"), Some(dec("8800")));
    assert_eq!(pricing.valid_from, NaiveDate::from_ymd_opt(2025, 7, 1));
    assert_eq!(
        pricing.support_options,
        vec![SupportOption {
            duration_years: 3,
            tier: "prosupport".to_string(),
            prices: BTreeMap::from([("USD".to_string(), dec("1200"))]),
        }]
    );

    let lot_b = outcome.model_by_lot("Lot B").unwrap();
    let pricing_b = outcome.pricing_of(&lot_b.id).unwrap();
    assert_eq!(pricing_b.net_price("EUR"), None);
    assert!(pricing_b.support_options.is_empty());

    assert_eq!(outcome.diagnostics.count(DiagnosticKind::PricingColumnFallback), 0);
    assert_eq!(outcome.basket.revision.as_deref(), Some("Q3 2025"));
    assert_eq!(outcome.basket.filename.as_deref(), Some("dell_q3_2025.xlsx"));
}

#[test]
fn test_single_lot_is_flushed_at_end_of_input() {
    let parser = BasketParser::default();
    let outcome = parser.parse(&dell_workbook(false), &dell_meta()).unwrap();

    assert_eq!(outcome.models.len(), 1);
    assert_eq!(outcome.models[0].lot_description, "Lot A");
    assert_eq!(outcome.configurations.len(), 3);
    assert_eq!(outcome.pricing.len(), 1);
}

#[test]
fn test_lenovo_marker_lot() {
    let parser = BasketParser::default();
    let meta = BasketMeta::new("lenovo").with_basket_id("lenovo-q3").with_period(3, 2025);
    let outcome = parser.parse(&lenovo_workbook(), &meta).unwrap();

    assert_eq!(outcome.models.len(), 1);
    let model = &outcome.models[0];
    assert_eq!(model.lot_description, "SMI1 : ThinkSystem SR630 V3 - 1yr Warranty");
    assert_eq!(model.lot_code.as_deref(), Some("SMI1"));
    assert_eq!(model.model_name, "ThinkSystem SR630 V3");
    assert_eq!(model.model_number.as_deref(), Some("SR630 V3"));
    assert_eq!(model.form_factor.as_deref(), Some("1U"));

    let processor = model.specification.processor.clone().unwrap();
    assert_eq!(processor.cores, Some(10));
    assert_eq!(processor.tdp, Some(150));
    assert_eq!(processor.base_frequency.as_deref(), Some("2.7GHz"));
    assert_eq!(processor.model, "4410T");
    assert_eq!(processor.count, 1);

    let memory = model.specification.memory.clone().unwrap();
    assert_eq!(memory.total_capacity, "128GB");
    assert_eq!(memory.module_count, 4);

    let configurations: Vec<_> = outcome.configurations_of(&model.id).collect();
    assert_eq!(configurations.len(), 2);
    assert_eq!(configurations[0].part_number.as_deref(), Some("4XG7A83799"));
    assert_eq!(configurations[1].quantity, 4);

    let pricing = outcome.pricing_of(&model.id).unwrap();
    assert_eq!(pricing.net_price("USD"), Some(dec("5000")));
    assert_eq!(pricing.support_options.len(), 1);
    assert_eq!(pricing.support_options[0].duration_years, 1);
    assert_eq!(pricing.support_options[0].tier, "warranty");
    assert_eq!(pricing.support_options[0].prices.get("EUR"), Some(&dec("4600")));

    assert_eq!(outcome.options.len(), 1);
    assert_eq!(outcome.options[0].category, Category::Memory);
    assert_eq!(outcome.diagnostics.count(DiagnosticKind::AmbiguousLotBoundary), 0);
}

#[test]
fn test_missing_lot_sheet_aborts_basket() {
    let parser = BasketParser::default();
    let workbook = Workbook::new(vec![Sheet::new("Summary", vec![row(&["nothing here"])])]);
    let outcome = parser.parse(&workbook, &dell_meta()).unwrap();

    assert!(outcome.models.is_empty());
    assert!(outcome.configurations.is_empty());
    assert!(outcome.pricing.is_empty());
    assert!(outcome.options.is_empty());
    assert!(outcome.diagnostics.has_errors());
    assert_eq!(outcome.diagnostics.count(DiagnosticKind::MissingRequiredSheet), 1);
}

#[test]
fn test_unmatched_descriptions_degrade_to_raw_text() {
    let mut rows = dell_rows(false);
    rows.push(row(&["", "Memory", "see attached memory matrix"]));
    let workbook = Workbook::new(vec![Sheet::new("Dell Lot Pricing", rows)]);
    let outcome = BasketParser::default().parse(&workbook, &dell_meta()).unwrap();

    let last = outcome.configurations.last().unwrap();
    assert_eq!(last.category, Category::Memory);
    assert_eq!(last.specification, SpecFragment::unparsed(Category::Memory, "see attached memory matrix"));
    assert_eq!(outcome.diagnostics.count(DiagnosticKind::RowParseWarning), 1);
    // earlier memory rows still aggregate
    assert_eq!(
        outcome.models[0].specification.memory.clone().unwrap().total_capacity,
        "32GB"
    );
}

#[test]
fn test_json_workbook_uses_fixed_price_offsets() {
    let json = r#"{
        "sheets": [
            {
                "name": "Dell Lot Pricing",
                "rows": [
                    ["Lot Description", "Item", "Specification"],
                    ["Lot A", "Processor", "1 x 4309Y", 12000, 9500]
                ]
            }
        ]
    }"#;
    let workbook = Workbook::from_json(json).unwrap();
    let outcome = BasketParser::default().parse(&workbook, &dell_meta()).unwrap();

    assert_eq!(outcome.models.len(), 1);
    assert_eq!(outcome.diagnostics.count(DiagnosticKind::PricingColumnFallback), 1);
    let pricing = outcome.pricing_of(&outcome.models[0].id).unwrap();
    assert_eq!(pricing.list_price, Some(dec("12000")));
    assert_eq!(pricing.net_price("USD"), Some(dec("9500")));
}

#[test]
fn test_fixed_offsets_disabled_without_header_row() {
    let workbook = Workbook::new(vec![Sheet::new(
        "Dell Lot Pricing",
        vec![
            row(&["Dell Quote"]),
            row(&[]),
            row(&[]),
            row(&["Lot", "Component", "Detail"]),
            vec![
                Cell::from("Lot A"),
                Cell::from("Processor"),
                Cell::from("1 x 4309Y"),
                Cell::Number(12000.0),
                Cell::Number(9500.0),
            ],
        ],
    )]);
    let mut config = BasketConfig::default();
    config.pricing.allow_fixed_offsets = false;
    let outcome = BasketParser::new(config).parse(&workbook, &dell_meta()).unwrap();

    assert_eq!(outcome.models.len(), 1);
    assert!(outcome.pricing.is_empty());
    assert_eq!(outcome.diagnostics.count(DiagnosticKind::PricingColumnFallback), 0);
}

#[test]
fn test_reparse_is_stable() {
    let parser = BasketParser::default();
    let workbook = dell_workbook(true);
    let first = parser.parse(&workbook, &dell_meta()).unwrap();
    let second = parser.parse(&workbook, &dell_meta()).unwrap();

    let specs = |o: &basket_core::ParseOutcome| -> Vec<ConsolidatedSpecification> {
        o.models.iter().map(|m| m.specification.clone()).collect()
    };
    assert_eq!(specs(&first), specs(&second));
    assert_eq!(
        serde_json::to_value(&first.configurations).unwrap(),
        serde_json::to_value(&second.configurations).unwrap()
    );
    assert_eq!(first.pricing, second.pricing);
}

#[test]
fn test_extensions_fill_missing_memory() {
    let rules = InferenceRules::generic();
    let stored = ConsolidatedSpecification {
        processor: Some(basket_core::models::spec::ProcessorSpec {
            count: 2,
            model: "6430".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    };
    let extensions = vec![
        Extension {
            quantity: Some(1),
            ..Extension::named("16GB RDIMM")
        },
        Extension {
            quantity: Some(1),
            ..Extension::named("16GB RDIMM")
        },
    ];

    let spec = augment_specification(&rules, &stored, &extensions);
    let memory = spec.memory.unwrap();
    assert_eq!(memory.total_capacity, "32GB");
    assert_eq!(memory.module_count, 2);
    assert_eq!(spec.processor, stored.processor);
}
