//! HTTP client tests against mock services
//!
//! Covers the BridgeDb cross-reference client, the three annotation providers and the
//! Cytoscape adapter.

use bdf_common::{BdfError, IdentifierType, Species};
use bdf_core::annotators::{
    disgenet::DisGeNetFetcher,
    opentargets::{OpenTargetsFacet, OpenTargetsFetcher},
    wikipathways::WikiPathwaysFetcher,
    DISGENET_COLUMN, OPENTARGETS_LOCATION_COLUMN, WIKIPATHWAYS_COLUMN,
};
use bdf_core::graph::{build_network, cytoscape::CytoscapeClient};
use bdf_core::xref::{BridgeDbClient, IdentifierMapper};
use bdf_core::{AnnotationFetcher, IdentifierRecord, MappedIdentifier, UnifiedTable};
use reqwest::Client;
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, body_string_contains, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn mapped() -> Vec<MappedIdentifier> {
    vec![
        MappedIdentifier::new("BRCA1", "HGNC", "672", "NCBI Gene"),
        MappedIdentifier::new("BRCA1", "HGNC", "ENSG00000012048", "Ensembl"),
        MappedIdentifier::new("TP53", "HGNC", "7157", "NCBI Gene"),
        MappedIdentifier::new("TP53", "HGNC", "ENSG00000141510", "Ensembl"),
    ]
}

// ============================================================================
// BridgeDb
// ============================================================================

#[tokio::test]
async fn test_bridgedb_batch_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Human/xrefsBatch/H"))
        .and(body_string_contains("BRCA1\nTP53"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "BRCA1\tHGNC\tL:672,En:ENSG00000012048\nTP53\tHGNC\tL:7157\nNOPE\tHGNC\tN/A\n",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(200).set_body_string("java.version\t17\nbridgedb.version\t3.0.23\n"))
        .mount(&server)
        .await;

    let client = BridgeDbClient::new(Client::new(), server.uri());
    let ids = vec![
        IdentifierRecord::new("BRCA1"),
        IdentifierRecord::new("TP53"),
        IdentifierRecord::new("NOPE"),
    ];
    let result = client
        .xref(&ids, &Species::default(), IdentifierType::Hgnc)
        .await
        .unwrap();

    assert_eq!(result.mapped.len(), 3);
    assert_eq!(result.mapped[1], MappedIdentifier::new("BRCA1", "HGNC", "ENSG00000012048", "Ensembl"));
    assert_eq!(result.metadata["datasource"], "BridgeDb");
    assert_eq!(result.metadata["query"]["size"], 3);
    assert_eq!(result.metadata["query"]["input_type"], "HGNC");
    assert_eq!(result.metadata["metadata"]["bridgedb.version"], "3.0.23");
}

#[tokio::test]
async fn test_bridgedb_server_error_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = BridgeDbClient::new(Client::new(), server.uri());
    let err = client
        .xref(&[IdentifierRecord::new("BRCA1")], &Species::default(), IdentifierType::Hgnc)
        .await
        .unwrap_err();

    assert!(matches!(err, BdfError::UpstreamService(_)));
    assert!(err.is_fatal());
    assert!(err.to_string().contains("503"));
}

// ============================================================================
// WikiPathways
// ============================================================================

#[tokio::test]
async fn test_wikipathways_rows_per_gene() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .and(header("accept", "application/sparql-results+json"))
        .and(body_string_contains("query="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "head": {"vars": ["gene_id", "pathway_id", "pathway_label", "pathway_gene_count"]},
            "results": {"bindings": [
                {"gene_id": {"value": "672"}, "pathway_id": {"value": "WP2261"},
                 "pathway_label": {"value": "Signaling pathways in glioblastoma"},
                 "pathway_gene_count": {"value": "82"}},
                {"gene_id": {"value": "7157"}, "pathway_id": {"value": "WP707"},
                 "pathway_label": {"value": "DNA damage response"},
                 "pathway_gene_count": {"value": "68"}}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = WikiPathwaysFetcher::new(Client::new(), format!("{}/sparql", server.uri()));
    let result = fetcher.fetch(&mapped()).await.unwrap();

    assert_eq!(result.table.len(), 2);
    let first = &result.table.rows()[0];
    assert_eq!(first.identifier, "BRCA1");
    assert_eq!(first.target, "672");
    let records = first.cells[WIKIPATHWAYS_COLUMN].records();
    assert_eq!(records[0]["pathway_id"], "WP2261");
    assert_eq!(result.metadata["datasource"], "WikiPathways");
    assert_eq!(result.metadata["query"]["size"], 2);
}

#[tokio::test]
async fn test_wikipathways_http_error_is_recoverable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = WikiPathwaysFetcher::new(Client::new(), server.uri());
    let err = fetcher.fetch(&mapped()).await.unwrap_err();
    assert!(matches!(err, BdfError::AnnotationFetch { .. }));
    assert!(!err.is_fatal());
}

// ============================================================================
// DisGeNET
// ============================================================================

#[tokio::test]
async fn test_disgenet_uses_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gda/gene/672,7157"))
        .and(header("authorization", "Bearer secret"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"geneid": 672, "diseaseid": "C0006142", "disease_name": "Malignant neoplasm of breast",
             "score": 1.0, "gene_dsi": 0.3, "gene_dpi": 0.9, "gene_pli": 0.0}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = DisGeNetFetcher::new(Client::new(), server.uri(), Some("secret".into()));
    let result = fetcher.fetch(&mapped()).await.unwrap();

    assert_eq!(result.table.len(), 1);
    let row = &result.table.rows()[0];
    assert_eq!(row.identifier, "BRCA1");
    assert_eq!(row.cells[DISGENET_COLUMN].records()[0]["diseaseid"], "C0006142");
}

#[tokio::test]
async fn test_disgenet_not_found_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = DisGeNetFetcher::new(Client::new(), server.uri(), Some("secret".into()));
    let result = fetcher.fetch(&mapped()).await.unwrap();
    assert!(result.table.is_empty());
    assert_eq!(result.metadata["datasource"], "DisGeNET");
}

// ============================================================================
// Open Targets
// ============================================================================

#[tokio::test]
async fn test_opentargets_location() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": {"ids": ["ENSG00000012048", "ENSG00000141510"]}
        })))
        .and(body_string_contains("subcellularLocations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"targets": [
                {"id": "ENSG00000012048", "approvedSymbol": "BRCA1",
                 "subcellularLocations": [
                    {"location": "Nucleus", "source": "HPA_main", "termSL": "SL-0191", "labelSL": "Nucleus"}
                 ]},
                {"id": "ENSG00000141510", "approvedSymbol": "TP53", "subcellularLocations": []}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = OpenTargetsFetcher::new(Client::new(), server.uri(), OpenTargetsFacet::Location);
    let result = fetcher.fetch(&mapped()).await.unwrap();

    assert_eq!(result.table.len(), 1);
    let row = &result.table.rows()[0];
    assert_eq!(row.identifier, "BRCA1");
    assert_eq!(row.target_source, "Ensembl");
    let location = &row.cells[OPENTARGETS_LOCATION_COLUMN].records()[0];
    assert_eq!(location["loc_identifier"], "SL-0191");
}

#[tokio::test]
async fn test_opentargets_graphql_error_names_option() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Cannot query field \"knownDrugs\""}]
        })))
        .mount(&server)
        .await;

    let fetcher = OpenTargetsFetcher::new(Client::new(), server.uri(), OpenTargetsFacet::Drugs);
    let err = fetcher.fetch(&mapped()).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("OpenTarget (option: Drug interactions)"));
    assert!(message.contains("knownDrugs"));
}

#[tokio::test]
async fn test_opentargets_without_ensembl_targets_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = OpenTargetsFetcher::new(Client::new(), server.uri(), OpenTargetsFacet::Reactome);
    let only_ncbi = vec![MappedIdentifier::new("TP53", "HGNC", "7157", "NCBI Gene")];
    let result = fetcher.fetch(&only_ncbi).await.unwrap();
    assert!(result.table.is_empty());
}

// ============================================================================
// Cytoscape
// ============================================================================

fn network_table() -> UnifiedTable {
    use bdf_core::{Cell, ColumnSpec, ResultRow, ResultTable};

    let mapped = MappedIdentifier::new("BRCA1", "HGNC", "ENSG00000012048", "Ensembl");
    let mut table = ResultTable::new(vec![ColumnSpec::records("GO_Process")]);
    table
        .push(ResultRow::for_mapped(&mapped).with_cell(
            "GO_Process",
            Cell::Records(vec![json!({"go_id": "GO:0006281", "go_name": "DNA repair"})
                .as_object()
                .cloned()
                .unwrap()]),
        ))
        .unwrap();
    UnifiedTable::from_result(&table).unwrap()
}

#[tokio::test]
async fn test_cytoscape_push_creates_and_styles_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "apiVersion": "v1", "cytoscapeVersion": "3.10.2"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/networks"))
        .and(query_param("format", "cyjs"))
        .and(query_param("collection", "BioDataFuse"))
        .and(query_param("title", "My network"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"networkSUID": 52})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/styles"))
        .and(body_partial_json(json!({"title": "BioDataFuse_style"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "BioDataFuse_style"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/apply/styles/BioDataFuse_style/52"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Visual Style applied."})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CytoscapeClient::new(Client::new(), server.uri());
    let network = build_network(&network_table());
    let metadata = client.push(&network, "My network").await.unwrap().unwrap();

    assert_eq!(metadata["datasource"], "Cytoscape");
    assert_eq!(metadata["metadata"]["source_version"]["cytoscapeVersion"], "3.10.2");
}

#[tokio::test]
async fn test_cytoscape_rejected_upload_is_visualization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cytoscapeVersion": "3.10.2"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/networks"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = CytoscapeClient::new(Client::new(), server.uri());
    let err = client
        .push(&build_network(&network_table()), "Network")
        .await
        .unwrap_err();
    assert!(matches!(err, BdfError::Visualization(_)));
}
