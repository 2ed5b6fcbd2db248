//! Prompt construction and response parsing

use crate::domain::{AnalysisContext, AnalyzerError, ClusterAnnotation, ClusterId, ClusterRow};
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt::Write;

/// System prompt describing the expected answer
pub const SYSTEM_PROMPT: &str = "\
You are an expert in cell biology and functional genomics. You analyze clusters of genes \
that share a phenotype in a genetic screen, identify the dominant biological process or \
pathway the cluster represents, and classify every member gene.

Respond with a single JSON object and nothing else, using these fields:
- \"cluster_id\": the cluster identifier you were given
- \"dominant_process\": short name of the dominant biological process or pathway
- \"pathway_confidence\": one of \"High\", \"Medium\", \"Low\"
- \"summary\": two to four sentences explaining the assignment
- \"established_genes\": genes with a well-established role in the dominant process
- \"novel_role_genes\": characterized genes whose role in this process would be new, \
each as {\"gene\": ..., \"rationale\": ...}
- \"uncharacterized_genes\": poorly characterized genes, each as {\"gene\": ..., \"rationale\": ...}

Every member gene must appear in exactly one of the three lists.";

/// Build the user prompt for one cluster
pub fn build_prompt(row: &ClusterRow, context: &AnalysisContext) -> String {
    let mut prompt = String::new();

    let screen_context = context.screen_context.trim();
    if !screen_context.is_empty() {
        let _ = writeln!(prompt, "Screen context:\n{screen_context}\n");
    }

    let _ = writeln!(prompt, "Cluster {}", row.cluster_id);
    let _ = writeln!(prompt, "Genes ({}): {}", row.gene_count(), row.genes.join(", "));

    let annotations = context.annotations_for(row);
    if !annotations.is_empty() {
        let _ = writeln!(prompt, "\nGene annotations:");
        for (gene, text) in annotations {
            let _ = writeln!(prompt, "- {gene}: {text}");
        }
    }

    let _ = write!(
        prompt,
        "\nAnalyze this cluster and answer with the JSON object described above."
    );
    prompt
}

/// Locate a JSON object in free-form model output
///
/// Accepts bare JSON, JSON inside a fenced code block, or JSON surrounded by
/// prose. Only objects are returned.
pub fn extract_json(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();
    if let Some(obj) = parse_object(trimmed) {
        return Some(obj);
    }

    if let Ok(fence) = Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```") {
        for cap in fence.captures_iter(trimmed) {
            if let Some(obj) = parse_object(&cap[1]) {
                return Some(obj);
            }
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&trimmed[start..=end])
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

/// Turn model output into an annotation for `cluster_id`
///
/// A response wrapped as `{"clusters": [ ... ]}` is unwrapped to its first
/// entry. The `cluster_id` is always the requested one; a different value
/// reported by the model is kept as `reported_cluster_id`.
pub fn parse_annotation(
    text: &str,
    cluster_id: &ClusterId,
) -> Result<ClusterAnnotation, AnalyzerError> {
    if text.trim().is_empty() {
        return Err(AnalyzerError::EmptyResponse(cluster_id.to_string()));
    }

    let mut obj = extract_json(text).ok_or_else(|| {
        AnalyzerError::InvalidResponse(format!(
            "no JSON object found in response for cluster {cluster_id}"
        ))
    })?;

    if !obj.contains_key("dominant_process") {
        if let Some(Value::Array(clusters)) = obj.get("clusters") {
            if let Some(Value::Object(first)) = clusters.first() {
                obj = first.clone();
            }
        }
    }

    let requested = Value::String(cluster_id.as_str().to_string());
    if let Some(reported) = obj.insert("cluster_id".to_string(), requested.clone()) {
        if reported != requested {
            tracing::debug!(
                cluster_id = %cluster_id,
                reported = %reported,
                "Analyzer reported a different cluster id"
            );
            obj.insert("reported_cluster_id".to_string(), reported);
        }
    }

    serde_json::from_value(Value::Object(obj)).map_err(|e| {
        AnalyzerError::InvalidResponse(format!(
            "response for cluster {cluster_id} does not match the annotation shape: {e}"
        ))
    })
}
