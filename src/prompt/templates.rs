use crate::planner::Action;

/// System instruction for per-action LLM calls.
pub fn system_instruction(action: Action) -> Option<&'static str> {
    match action {
        Action::Summarize => Some(
            "You are an expert product analyst. Create concise, informative summaries \
             that highlight key features, value proposition, and target audience. \
             Be objective and factual.",
        ),
        Action::Sentiment => Some(
            "You are a sentiment analysis expert. Analyze product reviews and data to \
             determine overall sentiment, identify key themes, and provide percentage \
             breakdowns. Be data-driven and specific.",
        ),
        Action::Compare => Some(
            "You are a product comparison expert. Compare products objectively across \
             features, price, quality, and value. Provide clear recommendations for \
             different use cases. Use tables and structured comparisons.",
        ),
        _ => None,
    }
}

pub const PLANNER_SYSTEM_PROMPT: &str = r#"Current Date: {{ current_date }}

You are an expert research planner for e-commerce product analysis.

Your job is to analyze user queries and create structured research plans.

Available actions:
- "search": Search the web for product information (requires 'query')
- "scrape": Scrape a product page (requires 'from_task' reference or URL in query)
- "summarize": Generate product summary (requires 'from_task' with product data)
- "sentiment": Analyze product sentiment (requires 'from_task' with product data)
- "compare": Compare multiple products (requires 'from_task' with multiple products)
- "final_report": Synthesize all results into final report (always last)

Rules:
1. If query contains a URL, start with "scrape"
2. If no URL, start with "search" then generate "scrape" tasks for the top results.
3. For "scrape" tasks following a "search", use 'url_index' to target different results (0, 1, 2).
4. Always include "final_report" as the last task
5. Use "from_task" to reference previous task outputs (e.g., "task:0", "task:1")
6. For comparison, ensure multiple products are scraped first

Examples:

Query: "Apple AirPods 4"
Plan:
{
  "intent": "product_research",
  "reasoning": "Search for top results, scrape the first product, then summarize and analyze sentiment.",
  "tasks": [
    {"action": "search", "query": "Apple AirPods 4 product page"},
    {"action": "scrape", "from_task": "task:0", "url_index": 0},
    {"action": "summarize", "from_task": "task:1"},
    {"action": "sentiment", "from_task": "task:1"},
    {"action": "final_report"}
  ]
}

Query: "Compare Apple AirPods 4 vs Samsung Galaxy Buds"
Plan:
{
  "intent": "product_comparison",
  "tasks": [
    {"action": "search", "query": "Apple AirPods 4"},
    {"action": "scrape", "from_task": "task:0", "url_index": 0},
    {"action": "search", "query": "Samsung Galaxy Buds"},
    {"action": "scrape", "from_task": "task:2", "url_index": 0},
    {"action": "compare", "from_task": "task:1,task:3"},
    {"action": "final_report"}
  ]
}

Query: "https://www.amazon.com/dp/B0D1XD1ZV3"
Plan:
{
  "intent": "product_analysis",
  "tasks": [
    {"action": "scrape", "query": "https://www.amazon.com/dp/B0D1XD1ZV3"},
    {"action": "summarize", "from_task": "task:0"},
    {"action": "sentiment", "from_task": "task:0"},
    {"action": "final_report"}
  ]
}

Respond ONLY with valid JSON matching the plan schema."#;

pub const PLANNER_PROMPT: &str = r#"Create a research plan for this query:

Query: {{ query }}

Respond with a JSON object matching this schema:
{
  "intent": "string describing the user's goal",
  "tasks": [
    {"action": "search|scrape|summarize|sentiment|compare|final_report", "query": "optional", "from_task": "optional task reference", "url_index": 0},
    ...
  ],
  "reasoning": "optional explanation"
}"#;

pub const SUMMARIZE_PROMPT: &str = r#"Analyze this product and provide a comprehensive summary.

Product Information:
{{ product_json }}

Create a summary that includes:
1. **Overview**: Brief introduction to the product
2. **Key Features**: Highlight 3-5 most important features
3. **Value Proposition**: What makes this product stand out
4. **Target Audience**: Who would benefit most from this product
5. **Pros & Cons**: Balanced assessment

Format as markdown with clear sections. Be concise but informative (300-400 words)."#;

pub const SENTIMENT_PROMPT: &str = r#"Analyze the sentiment for this product based on all available information.

Product Data:
{{ product_json }}

Perform a comprehensive sentiment analysis considering:
- Product rating and review count
- Product features and description
- Price positioning
- Availability
- Overall value proposition

Respond ONLY with a JSON object of this shape:
{
  "overall": "positive|neutral|negative",
  "score": 0.0,
  "positive_percentage": 0,
  "neutral_percentage": 0,
  "negative_percentage": 0,
  "key_positive_themes": ["..."],
  "key_negative_themes": ["..."],
  "confidence": 0.0,
  "analysis_summary": "..."
}

The percentage breakdown must sum to 100. Scores are between 0.0 and 1.0.
Be objective and data-driven."#;

pub const COMPARE_PROMPT: &str = r#"Compare these products and provide a comprehensive analysis.

Products to Compare:
{{ products_json }}

Create a detailed comparison that includes:

1. **Feature Comparison Matrix**: a table comparing key features, highlighting what is unique to each product
2. **Price Analysis**: compare prices, assess value for money, identify best budget and best premium option
3. **Quality Assessment**: compare ratings and review counts, identify the highest quality option
4. **Use Case Recommendations**: best for budget buyers, best for premium features, best overall value
5. **Pros & Cons**: for each product
6. **Final Verdict**: clear recommendation with reasoning

Format as markdown with tables where appropriate. Be objective and data-driven."#;

pub const FINAL_REPORT_PROMPT: &str = r#"Current Date: {{ current_date }}

Create a comprehensive research report based on the following analysis.

**Original Query:** {{ query }}

**Research Plan:**
{{ plan_json }}

**Analysis Results:**
{{ results_json }}

**CRITICAL GUIDELINES:**
1. Focus ONLY on actual data found in the analysis results above
2. Present features, pricing, and reviews that WERE found in the data
3. If data is limited, acknowledge it but still present what WAS found
4. Use objective, factual language - avoid speculation or assumptions
5. Include inline URL citations with bold retailer names, e.g. "$219.99 at **[Target](URL)**"

Create a professional research report with the following structure:

# Product Research Report

## Product Overview
Detailed product information based on search results and scraped data.

## Key Findings
Main insights, important features, pricing and availability information found.

## Sentiment Analysis
Customer sentiment and satisfaction levels. Only include this section if you
have actual review or sentiment data; otherwise omit it entirely.

## Comparison
How this product compares to alternatives. Only include this section if you
have actual comparison data; otherwise omit it entirely.

## Recommendations
Who might benefit from this product, best use cases, value assessment.

## Conclusion
Summary of findings based on the collected data.

## References
List of all sources used in this report:
{{ url_evidence }}

**FORMATTING:**
- Use markdown formatting, bullet points for lists and tables for comparisons
- Be comprehensive but concise
- Total length: {{ target_length }}
- Include the References section with all URLs at the very end"#;
