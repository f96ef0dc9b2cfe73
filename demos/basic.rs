use entity_vectorizer::{Document, EntityAnalyzer};

fn main() {
    let analyzer = EntityAnalyzer::default();

    // make documents
    let docs = vec![
        Document::new("d1", "John Smith visited Location42 on 2024-01-05"),
        Document::new("d2", "Mary joined the organizationAlpha board"),
        Document::new("d3", "John met Mary at LocationHQ"),
        Document::new("d4", "no entities here at all"),
    ];

    // entity extraction
    println!("entities(d1): {:?}", analyzer.extract_entities(&docs[0].content));

    // clustering
    for cluster in analyzer.cluster_documents(&docs) {
        let ids: Vec<&str> = cluster.members.iter().map(|d| d.id.as_str()).collect();
        println!("cluster {:<20} {:?}", cluster.key, ids);
    }

    // matrix + projection
    let matrix = analyzer.build_document_entity_matrix(&docs);
    for row in &matrix.rows {
        println!("{} {:?}", row.id, row.data);
    }
    match analyzer.compute_projection(&matrix) {
        Ok(projection) => println!("{:#?}", projection),
        Err(e) => eprintln!("projection failed: {e}"),
    }
}
