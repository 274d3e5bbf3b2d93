use querychart::annotation::AnnotationKind;
use querychart::{
    compute_annotations, detect_numeric_series, normalize_key, normalize_rows, prepare_chart, to_csv, Adapter,
    AnnotationResult, AnnotationSpec, CellValue, ColorPalette, EngineOptions, QueryResponse, Row, RowSet,
    VisualizationConfig,
};
use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

/// Helper function to run querychart with arguments and stdin input
fn run_querychart(args: &[&str], stdin: &str) -> Result<Vec<u8>, String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_querychart"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if let Some(mut input) = child.stdin.take() {
        input
            .write_all(stdin.as_bytes())
            .map_err(|e| format!("Failed to write to stdin: {}", e))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

fn run_json(args: &[&str], stdin: &str) -> Value {
    let stdout = run_querychart(args, stdin).expect("querychart failed");
    serde_json::from_slice(&stdout).expect("Output is not valid JSON")
}

fn rows(value: Value) -> Vec<Row> {
    RowSet::from_json(&value).unwrap().rows
}

#[test]
fn test_employee_scenario() {
    let data = rows(json!([{"employeeName": "Ann", "totalSales": 150.005}]));
    let config = VisualizationConfig::from_json_str(
        r#"{"type": "bar", "axes": {"x": "employeeName", "y": "totalSales"}}"#,
    )
    .unwrap();
    let options = EngineOptions::default();
    let chart = prepare_chart(&data, &config, &options);

    let row = &chart.rows[0];
    assert_eq!(row.fields.get("employeeName"), Some(&CellValue::Text("Ann".to_string())));
    assert_eq!(row.fields.get("totalSales"), Some(&CellValue::Number(150.01)));
    assert_eq!(row.name, "Ann");
    assert_eq!(row.value, 150.01);
    assert_eq!(row.color, options.palette.color_at(0));
}

#[test]
fn test_normalize_preserves_length_and_order() {
    let data = rows(json!([{"k": "c", "v": 3}, {"k": "a", "v": 1}, {"k": "b", "v": 2}]));
    let out = normalize_rows(&data, Some("k"), Some("v"), &EngineOptions::default());
    let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn test_normalize_key_direction() {
    assert_eq!(normalize_key(Some("Revenue DESC")), normalize_key(Some("Revenue")));
    assert_eq!(normalize_key(Some("Revenue")).as_deref(), Some("Revenue"));
}

#[test]
fn test_series_detection_scenario() {
    let data = rows(json!([{"region": "west", "q1": 10, "q2": 20, "color": "#fff", "name": "west"}]));
    let out = normalize_rows(&data, Some("region"), None, &EngineOptions::default());
    assert_eq!(detect_numeric_series(&out[0], Some("region")), vec!["q1", "q2"]);
}

#[test]
fn test_average_and_dot_scenarios() {
    let data = rows(json!([{"y": 10}, {"y": 20}, {"y": 30}]));
    let out = normalize_rows(&data, None, Some("y"), &EngineOptions::default());
    let average = AnnotationSpec::from(json!({"type": "line", "mode": "average"}));
    let result = compute_annotations(&out, &[average.clone()], Some("y"));
    assert!(matches!(result[0], AnnotationResult::HorizontalLine { value, .. } if value == 20.0));

    let empty = compute_annotations(&[], &[average], Some("y"));
    assert!(matches!(empty[0], AnnotationResult::HorizontalLine { value, .. } if value == 0.0));

    let dot = AnnotationSpec::from(json!({"type": "dot", "x": 5}));
    assert!(matches!(dot.kind, AnnotationKind::ReferencePoint { y: None, .. }));
    assert!(compute_annotations(&out, &[dot], Some("sales")).is_empty());
}

#[test]
fn test_csv_round_trip_with_embedded_quotes() {
    let data = rows(json!([
        {"name": "Bob \"The Closer\" Smith", "sales": 1200.456, "_secret": "x"},
        {"name": "Ann, Jr.", "sales": 10}
    ]));
    let out = normalize_rows(&data, Some("name"), Some("sales"), &EngineOptions::default());
    let bytes = to_csv(&out).unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("\"Bob \"\"The Closer\"\" Smith\""));

    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, vec!["name", "sales"]);

    let records: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    assert_eq!(
        records,
        vec![
            vec!["Bob \"The Closer\" Smith".to_string(), "1200.46".to_string()],
            vec!["Ann, Jr.".to_string(), "10".to_string()],
        ]
    );
}

#[test]
fn test_colors_are_positional() {
    let palette = ColorPalette::new(["#a", "#b"]);
    let options = EngineOptions::default().with_palette(palette);
    let first = normalize_rows(&rows(json!([{"v": 1}, {"v": 2}, {"v": 3}])), None, None, &options);
    let second = normalize_rows(&rows(json!([{"w": "x"}, {"w": "y"}, {"w": "z"}])), None, None, &options);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.color, b.color);
    }
    assert_eq!(first[2].color, "#a");
}

#[test]
fn test_query_response_fixture() {
    let body = fs::read_to_string("test/response.json").expect("Failed to read test response");
    let response = QueryResponse::from_json_str(&body).unwrap();
    let chart = response.prepare(&EngineOptions::default()).unwrap();

    assert_eq!(chart.adapter, Adapter::Bar);
    assert_eq!(chart.y_key.as_deref(), Some("total_sales"));
    assert_eq!(chart.rows[0].value, 1200.46);
    assert_eq!(chart.rows[1].value, 150.01);
    let keys: Vec<&str> = chart.series.iter().map(|s| s.column_key.as_str()).collect();
    assert_eq!(keys, vec!["total_sales"]);
    match &chart.annotations[0] {
        AnnotationResult::HorizontalLine { value, label, .. } => {
            assert!((value - 675.235).abs() < 1e-9);
            assert_eq!(label.as_deref(), Some("Avg"));
        }
        other => panic!("unexpected annotation {:?}", other),
    }
}

#[test]
fn test_end_to_end_bar_chart() {
    let sales = fs::read_to_string("test/sales.json").expect("Failed to read test data");
    let output = run_json(&["--config", "test/bar_config.json"], &sales);

    assert_eq!(output["adapter"], "bar");
    assert_eq!(output["yKey"], "q1");
    assert_eq!(output["rows"].as_array().unwrap().len(), 3);
    assert_eq!(output["rows"][1]["q1"], 15.56);
    assert!(output["rows"][0].get("_rowid").is_none());
    assert_eq!(output["series"][0]["columnKey"], "q1");
    assert_eq!(output["series"][1]["columnKey"], "q2");

    // The dot annotation has no y and is skipped
    let annotations = output["annotations"].as_array().unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0]["kind"], "horizontalLine");
    assert_eq!(annotations[1]["value"], 18.0);
    assert_eq!(annotations[1]["label"], "Target");
    assert!(output.get("notice").is_none());
}

#[test]
fn test_end_to_end_envelope_export() {
    let body = fs::read_to_string("test/response.json").expect("Failed to read test response");
    let stdout = run_querychart(&["--export", "Top Sellers"], &body).expect("export failed");
    let csv = String::from_utf8(stdout).unwrap();
    assert_eq!(
        csv,
        "employee_name,total_sales\n\"Bob \"\"The Closer\"\" Smith\",1200.46\n\"Ann\",150.01"
    );
}

#[test]
fn test_end_to_end_csv_input_with_options() {
    let csv = fs::read_to_string("test/employees.csv").expect("Failed to read test CSV");
    let output = run_json(&["--format", "csv", "--options", "test/palette.json"], &csv);

    assert_eq!(output["adapter"], "table");
    assert_eq!(output["rows"][0]["totalSales"], 150.0);
    assert_eq!(output["rows"][1]["totalSales"], 100.0);
    assert_eq!(output["rows"][0]["name"], "Ann");
    assert_eq!(output["rows"][1]["color"], "#222222");
    assert!(output["rows"][0].get("_internal").is_none());
}

#[test]
fn test_end_to_end_suggest() {
    let body = fs::read_to_string("test/response.json").expect("Failed to read test response");
    let output = run_json(&["--suggest", "compare total sales between employees"], &body);
    let options = output["options"].as_array().unwrap();
    assert_eq!(options[0]["type"], "table");
    assert_eq!(options[1]["type"], "bar");
    assert_eq!(options[1]["axes"]["y"], "SUM(amount) AS total_sales");
}

#[test]
fn test_end_to_end_empty_rows() {
    let output = run_json(&[], "[]");
    assert_eq!(output["notice"], "noData");
    assert!(output["rows"].as_array().unwrap().is_empty());
}

#[test]
fn test_end_to_end_invalid_json() {
    let result = run_querychart(&[], "not json");
    assert!(result.is_err(), "Should have failed on invalid JSON");
    assert!(result.unwrap_err().contains("Input is not valid JSON"));
}

#[test]
fn test_end_to_end_envelope_with_null_sections() {
    let body = json!({
        "sql_query": "SELECT status, COUNT(*) AS \"Order Count\" FROM orders GROUP BY status",
        "results": [{"status": "ok", "Order Count": 7}, {"status": "late", "Order Count": 2}],
        "visualization": {
            "type": "bar",
            "axes": {"x": "status", "y": "COUNT(*) AS \"Order Count\""},
            "settings": null,
            "annotations": null
        },
        "context_id": null
    });
    let output = run_json(&[], &body.to_string());
    assert_eq!(output["adapter"], "bar");
    assert_eq!(output["yKey"], "Order Count");
    assert_eq!(output["rows"][0]["value"], 7.0);
    assert!(output["annotations"].as_array().unwrap().is_empty());
}

#[test]
fn test_end_to_end_config_overrides_envelope() {
    let body = fs::read_to_string("test/response.json").expect("Failed to read test response");
    let output = run_json(&["--config", "test/bar_config.json"], &body);
    assert_eq!(output["adapter"], "bar");
    assert_eq!(output["xKey"], "region");
    assert_eq!(output["yKey"], "q1");
    assert_eq!(output["annotations"][1]["label"], "Target");
}
