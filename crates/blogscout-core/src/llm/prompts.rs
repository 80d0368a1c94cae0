//! Prompt templates for query refinement and result narration

/// System message for the refinement call
pub const REFINEMENT_SYSTEM_PROMPT: &str =
    "You are a careful, mapping-aware Elasticsearch query engineer.";

/// System message for the narration call
pub const NARRATION_SYSTEM_PROMPT: &str =
    "You are an expert data analyst specializing in blog analytics.";

/// User-facing messages
pub mod messages {
    pub const QUERY_REFINEMENT_FAILED: &str = "I couldn't understand your query. Please try rephrasing it or provide more specific details about what you're looking for.";
    pub const NO_RESULTS: &str = "No results were found for your query. Try broadening your search terms or checking for typos.";
}

/// Build the refinement prompt from the rendered cheatsheet of every
/// collection, the per-collection time fields and the literal user query
pub fn build_refinement_prompt(cheatsheet: &str, time_fields: &str, query: &str) -> String {
    let time_fields = if time_fields.is_empty() {
        "(none detected)"
    } else {
        time_fields
    };
    format!(
        r#"Translate the user's request into ONE Elasticsearch Search API request body,
returned as a single strict JSON object, against exactly one of the indices below.

## Indices and fields (from the live mappings)
{cheatsheet}

## Time fields
{time_fields}

## Output shape
Return one JSON object and nothing else (no markdown, no comments):
{{
  "index": "<blog-articles|blog-users>",
  "track_total_hits": true,
  "query": <Elasticsearch query DSL object>,
  "sort": [<sort objects>],
  "track_scores": true,
  "_source": {{ "includes": [], "excludes": [] }},
  "aggs": {{ }},
  "highlight": {{ }},
  "runtime_mappings": {{ }}
}}
Only "index", "track_total_hits" and "query" are required. Include "sort" only when the user
explicitly asks for an ordering, and then also set "track_scores": true. Include "_source",
"aggs", "highlight" or "runtime_mappings" only when the request needs them.

## Rules
- Pick exactly one index: "blog-articles" or "blog-users".
- Never output "size" or "from". Pagination belongs to the caller.
- Reference only fields listed for the chosen index. Never invent a field.
- Free text over articles searches ["title^3","summary^2","content","searchable_content","author_name"].
- Exact string matches use the ".keyword" field with "term".
- "tags" is a keyword field: use "term" or "terms", never "match" or "multi_match".
- Multiple topics go in bool.should with "minimum_should_match": 1.
- People, followers and engagement questions target "blog-users"; topical questions target "blog-articles".

## Sorting
- Sort only on keyword, date, numeric or boolean fields. Never sort on a text field.
- Without an explicit ordering request, leave "sort" out so relevance scoring and max_score survive.
- Recency tie-breakers use the first available of: "created_at" (date), "updated_at" (date),
  "createdTs" (long). As a last resort derive a date through "runtime_mappings" and sort on it.

## Dates and freshness
- Calendar dates and date math ("now-30d/d") go only on fields typed date.
- For "recent", "latest" or "fresh" requests blend freshness with function_score
  ("score_mode": "sum", "boost_mode": "multiply"):
  - with a date field, use a gauss decay:
    {{ "gauss": {{ "<date_field>": {{ "origin": "now", "scale": "90d", "decay": 0.5 }} }}, "weight": 1.5 }}
  - with only a numeric epoch field such as createdTs, never use "now"; use a script_score half-life:
    {{ "script_score": {{ "script": {{
      "source": "long now = new Date().getTime(); long t = doc[params.f].value; double ageMs = Math.max(0, now - t); double halfLifeMs = params.h * 86400000.0; return Math.exp(-0.69314718056 * ageMs / halfLifeMs);",
      "params": {{ "f": "<numeric_time_field>", "h": 90 }} }} }}, "weight": 1.5 }}

## Filters
- Drafts: {{ "term": {{ "status.keyword": "draft" }} }} when the field exists.
- Published only: {{ "term": {{ "is_published": true }} }} when the field exists.
- Numeric thresholds use "range".
- "One per author" and similar use "collapse": {{ "field": "<group_field>.keyword" }} without a sort.

## Examples

User: "Surface the most viewed vision transformer posts; break ties by newest first."
Output:
{{"index": "blog-articles", "track_total_hits": true,
 "query": {{"bool": {{"must": [{{"multi_match": {{"query": "vision transformer", "fields": ["title^3","summary^2","content","searchable_content","author_name"], "type": "most_fields"}}}}]}}}},
 "sort": [{{"views": {{"order": "desc"}}}}, {{"created_at": {{"order": "desc"}}}}],
 "track_scores": true}}

User: "articles about Transformers from 2023 to 2025"
Output:
{{"index": "blog-articles", "track_total_hits": true,
 "query": {{"function_score": {{
   "query": {{"bool": {{"must": [
     {{"multi_match": {{"query": "Transformers", "fields": ["title^3","summary^2","content","searchable_content","author_name"]}}}},
     {{"range": {{"created_at": {{"gte": "2023-01-01", "lte": "2025-12-31"}}}}}},
     {{"term": {{"is_published": true}}}}]}}}},
   "score_mode": "sum", "boost_mode": "multiply",
   "functions": [{{"gauss": {{"created_at": {{"origin": "now", "scale": "365d", "decay": 0.5}}}}, "weight": 1.5}}]}}}}}}

User: "Top users by followers active this year"
Output:
{{"index": "blog-users", "track_total_hits": true,
 "query": {{"bool": {{"must": [{{"range": {{"created_at": {{"gte": "now-365d/d"}}}}}}]}}}},
 "sort": [{{"followers": {{"order": "desc"}}}}, {{"engagement_score": {{"order": "desc"}}}}],
 "track_scores": true}}

Now convert this request:
User: "{query}"
"#
    )
}

/// Build the narration prompt
pub fn build_narration_prompt(query: &str, results_json: &str, result_count: u64) -> String {
    format!(
        r#"Analyze the search results below and answer the user's question.

Guidelines:
- State how many results were found.
- Point out patterns and trends across the results.
- Cite specific examples (titles, authors, counts) from the data.
- Suggest a related follow-up query when useful.
- Use clear, non-technical language.

Example:
Original query: "Find popular articles about python"
Results: [{{"title": "Python Best Practices", "author_name": "Alice", "likes": 150}}, {{"title": "FastAPI Tutorial", "author_name": "Bob", "likes": 89}}]
Number of results: 2
Analysis:
I found 2 popular Python articles. Python Best Practices by Alice leads with 150 likes, and FastAPI Tutorial by Bob follows with 89. Practical, how-to style posts draw the most engagement here; a follow-up search for other tutorials by these authors may be worthwhile.

Now analyze these results:
Original query: "{query}"
Results: {results_json}
Number of results: {result_count}

Answer in plain prose only. Do not wrap the answer in quotes, do not return JSON and do not use markdown or code blocks.
"#
    )
}
