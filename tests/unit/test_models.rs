//! Unit tests for diagram model types.

use diagram_studio_api::models::{Analysis, DiagramType};

#[test]
fn test_diagram_type_parse_known_ids() {
    assert_eq!(DiagramType::parse("er_diagram"), Some(DiagramType::ErDiagram));
    assert_eq!(DiagramType::parse("flowchart"), Some(DiagramType::Flowchart));
    assert_eq!(
        DiagramType::parse("class_diagram"),
        Some(DiagramType::ClassDiagram)
    );
}

#[test]
fn test_diagram_type_parse_is_case_insensitive() {
    assert_eq!(DiagramType::parse("ER_DIAGRAM"), Some(DiagramType::ErDiagram));
    assert_eq!(DiagramType::parse("FlowChart"), Some(DiagramType::Flowchart));
}

#[test]
fn test_diagram_type_parse_rejects_unknown() {
    assert_eq!(DiagramType::parse("gantt"), None);
    assert_eq!(DiagramType::parse(""), None);
    assert_eq!(DiagramType::parse("er diagram"), None);
}

#[test]
fn test_diagram_type_wire_tags() {
    assert_eq!(DiagramType::ErDiagram.as_str(), "er_diagram");
    assert_eq!(DiagramType::Flowchart.as_str(), "flowchart");
    assert_eq!(DiagramType::ClassDiagram.as_str(), "class_diagram");

    let json = serde_json::to_string(&DiagramType::ErDiagram).unwrap();
    assert_eq!(json, "\"er_diagram\"");
}

#[test]
fn test_supported_list_names_all_types() {
    let list = DiagramType::supported_list();
    assert_eq!(list, "er_diagram, flowchart, class_diagram");
}

#[test]
fn test_analysis_serializes_camel_case() {
    let analysis = Analysis {
        summary: "s".to_string(),
        flow_points: vec!["a".to_string()],
        ..Default::default()
    };
    let value = serde_json::to_value(&analysis).unwrap();
    assert!(value.get("flowPoints").is_some());
    assert!(value.get("arrowMeanings").is_some());
    assert!(value.get("flow_points").is_none());
}

#[test]
fn test_analysis_defaults_missing_fields() {
    let analysis: Analysis = serde_json::from_str(r#"{"summary": "only summary"}"#).unwrap();
    assert_eq!(analysis.summary, "only summary");
    assert!(analysis.flow_points.is_empty());
    assert!(analysis.arrow_meanings.is_empty());
    assert!(analysis.extra.is_empty());
}

#[test]
fn test_analysis_round_trips_extra_fields() {
    let analysis: Analysis = serde_json::from_str(
        r#"{"summary": "s", "flowPoints": [], "confidence": "high"}"#,
    )
    .unwrap();
    assert_eq!(
        analysis.extra.get("confidence"),
        Some(&serde_json::json!("high"))
    );

    let back = serde_json::to_value(&analysis).unwrap();
    assert_eq!(back.get("confidence"), Some(&serde_json::json!("high")));
}

#[test]
fn test_analysis_is_empty() {
    assert!(Analysis::default().is_empty());
    let analysis = Analysis {
        summary: "x".to_string(),
        ..Default::default()
    };
    assert!(!analysis.is_empty());
}
