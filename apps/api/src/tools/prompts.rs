// Prompt templates for every content tool.
// Shared fragments ({json_only}, {banned_phrases}) come from llm_client::prompts and
// variant fragments ({platform_guidance}, {guidelines}) from tools::catalog.

/// Content analysis. Replace: {content}, {json_only}
pub const CONTENT_ANALYSIS_TEMPLATE: &str = r##"You are an advanced content optimization assistant. Analyze the provided content and return a detailed JSON response. You MUST include at least 7 main keywords and 7 LSI keywords, and populate ALL sections of the analysis.

Return a JSON object with this EXACT schema:
{
  "targetKeyword": "main target keyword",
  "keywords": {
    "main": [
      { "word": "primary keyword", "count": 5, "density": 2.5 }
    ],
    "lsi": [
      { "word": "semantic keyword", "count": 3, "density": 1.5 }
    ],
    "related": ["related keyword"],
    "questions": ["question a reader would ask"]
  },
  "structure": {
    "headings": {
      "h1": ["Main title with primary keyword"],
      "h2": ["Major section"],
      "h3": ["Subsection"]
    },
    "readability": {
      "score": 85,
      "level": "beginner | intermediate | advanced",
      "suggestions": ["Use shorter sentences"]
    }
  },
  "seo": {
    "score": 85,
    "recommendations": ["Include target keyword in meta description"],
    "titleOptimization": {
      "current": "Current title of the page",
      "suggestions": ["Improved title"]
    },
    "contentGaps": {
      "missingTopics": ["topic the content does not cover"],
      "competitorKeywords": ["keyword competitors rank for"]
    }
  },
  "improvements": {
    "priority": ["most important change"],
    "additional": ["nice to have change"]
  },
  "improvementSuggestions": {
    "content": [{ "type": "addition", "suggestion": "what to add", "priority": "high" }],
    "style": [{ "type": "clarity", "suggestion": "what to change", "priority": "medium" }],
    "seo": [{ "type": "keywords", "suggestion": "what to optimize", "priority": "low" }]
  }
}

Rules:
- "score" values are integers from 0 to 100.
- "density" is a percentage of total words.
- "targetKeyword" is the single phrase the content should rank for.

{json_only}

Analyze and optimize the following content:

{content}"##;

/// Conversational headlines (professional, creative, news and social styles).
/// Replace: {topic}, {style}, {tone}, {count}, {json_only}
pub const HEADLINE_TEMPLATE: &str = r##"Write headlines about the following topic in a conversational and relatable voice. Keep the tone friendly, as if you were telling a friend about it over coffee. Use simple words and a mix of short and medium-length sentences. Avoid sounding overly polished.

Return your response in this exact JSON format:
{
  "headlines": ["headline one", "headline two", "headline three"],
  "analysis": {
    "tone": "what the headlines sound like",
    "impact": "why a reader would click",
    "summary": "short overview of the angle taken",
    "suggestions": ["how to make them even better"]
  }
}

Topic: {topic}
Style: {style}
Tone: {tone}
Number of headlines: {count}

Each headline must be a single line of at most 200 characters.

{json_only}"##;

/// Blog post ideas. Replace: {topic}, {tone}, {count}, {json_only}
pub const BLOG_IDEAS_TEMPLATE: &str = r##"Create engaging blog post ideas about the following topic. Write in a natural, relatable style while staying professional. Focus on the value each post gives the reader.

For each idea think about:
- A compelling headline that draws interest
- The value it brings to readers
- Key points that could be covered
- The target audience and their questions

Return the response in this exact JSON format:
{
  "headlines": [
    "Your first headline here",
    "Another great topic idea"
  ],
  "analysis": {
    "tone": "balanced mix of professional and approachable",
    "impact": "what readers will gain from this content",
    "summary": "overview of the topic's value and relevance",
    "keywords": ["relevant", "keyword", "phrases"],
    "suggestions": ["content angle to explore"]
  }
}

Topic: {topic}
Style: blog
Tone: {tone}
Number of ideas: {count}

Guidelines:
- Keep descriptions clear but conversational
- Focus on real value and practical insights
- Address reader questions and pain points
- Each headline must be at most 200 characters

{json_only}"##;

/// Calls to action. Replace: {topic}, {tone}, {count}, {json_only}
pub const CTA_TEMPLATE: &str = r##"Create compelling call-to-action (CTA) ideas for the following purpose. Write in a persuasive yet natural style that motivates action while building trust.

For each CTA consider the psychological principle behind it, the audience's motivation, the best placement and A/B testing variations.

Return the response in this exact JSON format:
{
  "headlines": [
    "Primary CTA text here",
    "Another compelling option"
  ],
  "analysis": {
    "tone": "persuasive yet trustworthy approach",
    "impact": "expected conversion impact and why",
    "summary": "strategic overview and triggers used",
    "suggestions": ["placement recommendation", "timing suggestion"],
    "variations": [
      { "text": "alternative version", "context": "when to use it", "audience": "audience segment" }
    ],
    "urgency": "balanced | high | low",
    "type": "purchase | signup | download | contact"
  }
}

Purpose: {topic}
Style: cta
Tone: {tone}
Number of CTAs: {count}

Guidelines:
- Lead with a clear value proposition
- Use action-oriented language
- Create urgency without being pushy
- Each CTA must be at most 200 characters

{json_only}"##;

/// Summaries. Replace: {content}, {length_instruction}, {format_instruction},
/// {focus_instruction}, {tone_instruction}, {json_only}
pub const SUMMARY_TEMPLATE: &str = r##"Summarize the following content with these specifications:
Length: {length_instruction}
Format: {format_instruction}
{focus_instruction}
{tone_instruction}

Rules:
1. Maintain accuracy and context
2. Use clear, simple language
3. Highlight the most important information
4. Keep the original meaning intact
5. Include key statistics or data if present
6. The summary must be shorter than the original

Return a JSON object with this EXACT schema:
{
  "summary": "the summary text",
  "keyPoints": ["key point one", "key point two"]
}

{json_only}

Content to summarize:
{content}"##;

/// Rephrasing. Replace: {content}, {style}, {tone}, {keyword_instruction}, {json_only}
pub const REPHRASE_TEMPLATE: &str = r##"You are a professional content rephraser. Rewrite the following content while keeping its structure and flow.

Style: {style}
Tone: {tone}
{keyword_instruction}

Requirements:
1. Keep the original meaning and structure
2. Match the specified style and tone
3. Keep section breaks and paragraphs
4. Do not use asterisks or markdown formatting
5. Keep headings as plain text

Return a JSON object with this EXACT schema:
{
  "rephrased": "the rewritten content",
  "keywordsMaintained": ["key term kept from the original"],
  "readabilityScore": "score from 1-10 with a brief explanation",
  "toneAnalysis": "brief tone analysis"
}

{json_only}

Content to rephrase:
{content}"##;

/// Hashtags. Replace: {content}, {platform}, {platform_guidance}, {json_only}
pub const HASHTAG_TEMPLATE: &str = r##"Generate hashtags for the following content.

Content:
{content}

Platform: {platform}

Platform guidelines:
{platform_guidance}

Instructions:
1. Extract the key themes of the content
2. Generate 5-7 unique, platform-optimized hashtags
3. Prefix each hashtag with #
4. Use CamelCase for multi-word hashtags
5. At most 30 characters, no spaces or special characters

Return a JSON object with this EXACT schema:
{
  "hashtags": ["#ProfessionalGrowth", "#LeadershipInsights"]
}

{json_only}"##;

/// Social posts. Replace: {content}, {format}, {platform}, {guidelines},
/// {banned_phrases}, {json_only}
pub const SOCIAL_POST_TEMPLATE: &str = r##"Create 4 different {format} {platform} posts based on the following content. Each variation should:
{guidelines}

Original content:
{content}

Important:
- Do NOT use any of these banned phrases: {banned_phrases}
- Each variation should take a different angle
- Use simple, clear language

Return a JSON object with this EXACT schema:
{
  "variations": [
    { "content": "post text", "hashtags": ["#Tag"] }
  ]
}

{json_only}"##;

/// Keyword extraction. Replace: {content}, {json_only}
pub const KEYWORD_TEMPLATE: &str = r##"As an expert content analyzer, provide a comprehensive keyword analysis of the following content.

Content to analyze:
{content}

Return a JSON object with this EXACT schema:
{
  "keywords": ["keyword one", "keyword two"],
  "topics": ["topic one", "topic two"],
  "relevanceScores": { "keyword one": 0.95, "keyword two": 0.8 },
  "keywordTypes": { "keyword one": "primary", "keyword two": "secondary" },
  "keywordFrequency": { "keyword one": 5, "keyword two": 3 },
  "keywordDensity": { "keyword one": "2.5%", "keyword two": "1.5%" },
  "contentSummary": "brief 2-3 sentence summary of the content",
  "contentType": "blog post | article | technical document | other",
  "mainTheme": "the primary theme or message",
  "wordCount": 150
}

Rules:
1. Extract meaningful keywords and phrases
2. Relevance scores are between 0 and 1
3. Keyword types are primary, secondary or related

{json_only}"##;

/// Long-form articles. The answer uses section markers, not JSON.
/// Replace: {title}, {content_type}, {tone}, {length}, {target_words}, {language},
/// {keywords_line}, {notes_line}, {banned_phrases}
pub const ARTICLE_TEMPLATE: &str = r##"You are a professional content writer. Generate a {content_type} about "{title}" following these exact specifications:

Key Requirements:
- Topic: {title}
- Type: {content_type}
- Tone: {tone}
- Length: {length} (~{target_words} words)
- Language: {language}
{keywords_line}
{notes_line}

Title Rules:
1. Use simple English that non-native speakers can easily understand
2. If a concept needs explanation, include a brief clarification
3. Avoid these phrases: {banned_phrases}
4. Keep titles clear, direct and informative

Your response MUST follow this EXACT format with these EXACT headings:

===META INFORMATION START===
SEO Title: [clear title, 60 characters max]
Meta Description: [compelling description, 160 characters max]
Target Keywords: [3-5 keywords, comma-separated]
Target Audience: [primary and secondary audience]
===META INFORMATION END===

===CONTENT START===
[full content using HTML tags: h1, h2, h3, p, ul, ol, li, blockquote, strong]
===CONTENT END===

Do not add any text outside the section markers."##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashtag_examples_stay_inside_templates() {
        assert!(HASHTAG_TEMPLATE.contains(r##""hashtags": ["#ProfessionalGrowth", "#LeadershipInsights"]"##));
        assert!(HASHTAG_TEMPLATE.ends_with("{json_only}"));
        assert!(SOCIAL_POST_TEMPLATE.contains(r##""hashtags": ["#Tag"]"##));
        assert!(SOCIAL_POST_TEMPLATE.ends_with("{json_only}"));
    }
}
