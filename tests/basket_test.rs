use basketd::etf::basket_v1::{evaluate, BasketError, TOP_HOLDINGS};
use basketd::input::prices::PriceTable;

const PRICES: &str = "DATE,A,B,C,D,E,F\n\
    2024-01-01,10,20,5,5,1,2\n\
    2024-01-02,12,18,5,5,1,2\n";

fn table() -> PriceTable {
    PriceTable::from_reader(PRICES.as_bytes()).unwrap()
}

#[test]
fn test_that_constituents_keep_input_order_and_length() {
    let report = evaluate(&table(), b"name,weight\nC,1\nA,2\nB,3\n").unwrap();

    let names: Vec<&str> = report
        .constituents
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["C", "A", "B"]);
}

#[test]
fn test_that_series_covers_every_date_ascending() {
    let report = evaluate(&table(), b"name,weight\nA,1.0\nB,0.5\n").unwrap();

    let dates: Vec<&str> = report.etf_series.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
    assert_eq!(report.etf_series[0].price, 20.0);
    assert_eq!(report.etf_series[1].price, 21.0);
}

#[test]
fn test_that_top_holdings_are_capped_ranked_and_stable() {
    //Six constituents, only five survive the cut
    let report = evaluate(&table(), b"name,weight\nA,1\nB,1\nC,1\nD,1\nE,1\nF,1\n").unwrap();
    assert_eq!(report.top_holdings.len(), TOP_HOLDINGS);

    //Descending by holding value
    for pair in report.top_holdings.windows(2) {
        assert!(pair[0].holding_value >= pair[1].holding_value);
    }

    //C and D tie on 5.0 and must keep input order; E (1.0) is cut, not C or D
    let names: Vec<&str> = report
        .top_holdings
        .iter()
        .map(|h| h.name.as_str())
        .collect();
    assert_eq!(names, vec!["B", "A", "C", "D", "F"]);

    //Fewer than five constituents returns them all
    let small = evaluate(&table(), b"name,weight\nA,1\nB,1\n").unwrap();
    assert_eq!(small.top_holdings.len(), 2);
}

#[test]
fn test_that_evaluation_is_idempotent() {
    let prices = table();
    let upload = b"name,weight\nA,1.0\nB,0.5\nC,2.0\n";

    let first = evaluate(&prices, upload).unwrap();
    let second = evaluate(&prices, upload).unwrap();
    assert_eq!(first, second);

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn test_that_weights_are_not_normalized() {
    //Weights sum to 2.0 and simply scale the series
    let single = evaluate(&table(), b"name,weight\nA,1.0\n").unwrap();
    let doubled = evaluate(&table(), b"name,weight\nA,2.0\n").unwrap();

    for (a, b) in single.etf_series.iter().zip(doubled.etf_series.iter()) {
        assert_eq!(b.price, 2.0 * a.price);
    }
}

#[test]
fn test_that_nan_weight_surfaces_invalid_weight() {
    //A NaN weight on a basket large enough to reach the holdings ranking must be caught by
    //the weight check, never fall through to the computation
    let res = evaluate(&table(), b"name,weight\nA,NaN\nB,1\n");
    assert_eq!(res.unwrap_err(), BasketError::InvalidWeight);
}

#[test]
fn test_that_first_failing_check_wins() {
    //Missing required column and negative weight at once: the schema error surfaces
    let res = evaluate(&table(), b"symbol,weight\nA,-1\n");
    assert_eq!(res.unwrap_err(), BasketError::Schema(vec!["name".to_string()]));
}

#[test]
fn test_worked_example_and_rejections() {
    let prices = PriceTable::from_reader(
        "DATE,A,B\n2024-01-01,10,20\n2024-01-02,12,18\n".as_bytes(),
    )
    .unwrap();

    //Scenario 1: weighted evaluation
    let report = evaluate(&prices, b"name,weight\nA,1.0\nB,0.5\n").unwrap();
    assert_eq!(report.etf_series[0].date, "2024-01-01");
    assert_eq!(report.etf_series[0].price, 20.0);
    assert_eq!(report.etf_series[1].date, "2024-01-02");
    assert_eq!(report.etf_series[1].price, 21.0);
    assert_eq!(report.constituents[0].weight, 1.0);
    assert_eq!(report.constituents[0].latest_close, 12.0);
    assert_eq!(report.constituents[1].weight, 0.5);
    assert_eq!(report.constituents[1].latest_close, 18.0);
    assert_eq!(report.top_holdings[0].holding_value, 12.0);
    assert_eq!(report.top_holdings[1].holding_value, 9.0);

    //Scenario 2: negative weight
    assert_eq!(
        evaluate(&prices, b"name,weight\nA,-1\n").unwrap_err(),
        BasketError::NegativeWeight
    );

    //Scenario 3: duplicate constituent
    assert_eq!(
        evaluate(&prices, b"name,weight\nA,1\nA,1\n").unwrap_err(),
        BasketError::Duplicate(vec!["A".to_string()])
    );

    //Scenario 4: unknown constituent
    assert_eq!(
        evaluate(&prices, b"name,weight\nZ,1\n").unwrap_err(),
        BasketError::UnknownConstituent(vec!["Z".to_string()])
    );

    //Scenario 5: empty upload
    assert_eq!(
        evaluate(&prices, b"name,weight\n").unwrap_err(),
        BasketError::EmptyInput
    );
}

#[test]
fn test_that_random_table_evaluates_cleanly() {
    let prices = PriceTable::random(100, vec!["ABC", "BCD"]);
    let report = evaluate(&prices, b"name,weight\nABC,0.6\nBCD,0.4\n").unwrap();

    assert_eq!(report.etf_series.len(), 100);
    assert_eq!(report.constituents.len(), 2);
    assert_eq!(report.top_holdings.len(), 2);
}
