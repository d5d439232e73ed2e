/// A dictionary concept identifier split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptIdentifier {
    /// Local identifier of the primary concept
    pub concept_id: String,

    /// Database prefix of the primary identifier, e.g. `MESH`
    pub database: Option<String>,

    /// Remaining identifiers of a `|`-separated compound id, kept verbatim
    pub additional_ids: Vec<String>,
}

/// Split `MESH:D007239|D000068354` into `D007239`, `MESH` and
/// `["D000068354"]`.
///
/// The database is everything before the last `:` of the primary id, so
/// identifiers such as `NCBI:Gene:1017` keep `NCBI:Gene` as database.
pub fn parse_concept_identifier(identifier: &str) -> ConceptIdentifier {
    let mut parts = identifier.split('|');
    let primary = parts.next().unwrap_or_default();
    let additional_ids = parts.map(str::to_string).collect();

    let (database, concept_id) = match primary.rsplit_once(':') {
        Some((database, concept_id)) => (Some(database.to_string()), concept_id.to_string()),
        None => (None, primary.to_string()),
    };

    ConceptIdentifier {
        concept_id,
        database,
        additional_ids,
    }
}
