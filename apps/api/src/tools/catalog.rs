//! Template catalog: picks the template for a `(task, variant)` pair and supplies
//! the fragments a variant contributes to it.

use crate::llm_client::error::GenerationError;
use crate::models::task::{
    HashtagPlatform, HeadlineStyle, SocialFormat, SocialPlatform, TaskKind, Variant,
};
use crate::tools::prompts;

/// Template for `task` under `variant`. Pairs the catalog does not know are a
/// programmer error and fail with `Configuration`.
pub fn template_for(
    task: TaskKind,
    variant: Option<Variant>,
) -> Result<&'static str, GenerationError> {
    let template = match (task, variant) {
        (TaskKind::Headlines, None) => prompts::HEADLINE_TEMPLATE,
        (TaskKind::Headlines, Some(Variant::Headline(style))) => headline_template(style),
        (TaskKind::Hashtags, None | Some(Variant::Hashtag(_))) => prompts::HASHTAG_TEMPLATE,
        (TaskKind::SocialPosts, Some(Variant::Social(_, _))) => prompts::SOCIAL_POST_TEMPLATE,
        (TaskKind::ContentAnalysis, None) => prompts::CONTENT_ANALYSIS_TEMPLATE,
        (TaskKind::Summarization, None) => prompts::SUMMARY_TEMPLATE,
        (TaskKind::Rephrasing, None) => prompts::REPHRASE_TEMPLATE,
        (TaskKind::KeywordExtraction, None) => prompts::KEYWORD_TEMPLATE,
        (TaskKind::Article, None) => prompts::ARTICLE_TEMPLATE,
        (task, variant) => {
            return Err(GenerationError::Configuration(format!(
                "no template for {task:?} with variant {variant:?}"
            )))
        }
    };
    Ok(template)
}

fn headline_template(style: HeadlineStyle) -> &'static str {
    match style {
        HeadlineStyle::Blog => prompts::BLOG_IDEAS_TEMPLATE,
        HeadlineStyle::Cta => prompts::CTA_TEMPLATE,
        HeadlineStyle::Professional
        | HeadlineStyle::Creative
        | HeadlineStyle::News
        | HeadlineStyle::Social => prompts::HEADLINE_TEMPLATE,
    }
}

/// Fragment named `placeholder` contributed by `variant`, if any.
pub fn fragment(variant: Option<Variant>, placeholder: &str) -> Option<&'static str> {
    match (variant, placeholder) {
        (Some(Variant::Hashtag(platform)), "platform_guidance") => {
            Some(hashtag_guidance(platform))
        }
        (None, "platform_guidance") => Some(hashtag_guidance(HashtagPlatform::General)),
        (Some(Variant::Social(format, platform)), "guidelines") => {
            Some(social_guidelines(format, platform))
        }
        _ => None,
    }
}

pub fn hashtag_guidance(platform: HashtagPlatform) -> &'static str {
    match platform {
        HashtagPlatform::Linkedin => {
            "- Focus on professional, business and industry-specific hashtags\n\
             - Emphasize career development, industry trends and professional insights\n\
             - Avoid overly casual or personal hashtags"
        }
        HashtagPlatform::Instagram => {
            "- Create visually engaging and trendy hashtags\n\
             - Mix popular and niche-specific tags\n\
             - Include community and lifestyle-related hashtags"
        }
        HashtagPlatform::Twitter => {
            "- Keep hashtags concise and punchy\n\
             - Focus on current conversations and trending topics\n\
             - Aim for clarity and immediate understanding"
        }
        HashtagPlatform::Facebook => {
            "- Focus on community engagement and shareable content\n\
             - Use a mix of broad and specific hashtags\n\
             - Include tags that encourage interaction"
        }
        HashtagPlatform::General => {
            "- Generate relevant and meaningful hashtags\n\
             - Keep a direct connection to the content\n\
             - Balance specificity and broad appeal"
        }
    }
}

pub fn social_guidelines(format: SocialFormat, platform: SocialPlatform) -> &'static str {
    use SocialFormat::*;
    use SocialPlatform::*;

    match (format, platform) {
        (Professional, Linkedin) => {
            "- Avoid cliché business phrases\n\
             - Focus on value and insights\n\
             - Be between 150-200 words\n\
             - End with a clear call-to-action\n\
             - Include relevant hashtags"
        }
        (Professional, Twitter) => {
            "- Be under 280 characters\n\
             - Be concise and impactful\n\
             - Keep a professional tone\n\
             - Include relevant hashtags"
        }
        (Professional, Facebook) => {
            "- Be engaging and conversational\n\
             - Keep a professional tone\n\
             - Invite meaningful discussion\n\
             - End with a clear call-to-action"
        }
        (Howto, Linkedin) => {
            "- Break the process down clearly\n\
             - Use numbered steps or bullet points\n\
             - Include practical tips for professionals\n\
             - Include relevant hashtags"
        }
        (Howto, Twitter) => {
            "- Break complex ideas into simple steps\n\
             - Stay within character limits\n\
             - Be easy to follow\n\
             - Include relevant hashtags"
        }
        (Howto, Facebook) => {
            "- Present steps in an engaging way\n\
             - Use a conversational tone\n\
             - Include practical examples\n\
             - Invite community discussion"
        }
        (Comparison, Linkedin) => {
            "- Present clear comparisons\n\
             - Highlight key differences\n\
             - Stay objective\n\
             - Include professional insights"
        }
        (Comparison, Twitter) => {
            "- Present concise comparisons\n\
             - Stay within character limits\n\
             - Use clear contrasts\n\
             - Include relevant hashtags"
        }
        (Comparison, Facebook) => {
            "- Present engaging comparisons\n\
             - Include examples\n\
             - Encourage interaction\n\
             - Use relevant hashtags"
        }
        (Stepbystep, Linkedin) => {
            "- Present clear, numbered steps\n\
             - Include professional context\n\
             - Keep a clear structure\n\
             - Use relevant hashtags"
        }
        (Stepbystep, Twitter) => {
            "- Break down steps clearly\n\
             - Stay within character limits\n\
             - Keep it brief\n\
             - Include relevant hashtags"
        }
        (Stepbystep, Facebook) => {
            "- Present clear steps\n\
             - Be engaging and conversational\n\
             - Include examples\n\
             - Invite discussion"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_styles_select_templates() {
        let blog = template_for(TaskKind::Headlines, Some(Variant::Headline(HeadlineStyle::Blog)));
        assert_eq!(blog.unwrap(), prompts::BLOG_IDEAS_TEMPLATE);
        let cta = template_for(TaskKind::Headlines, Some(Variant::Headline(HeadlineStyle::Cta)));
        assert_eq!(cta.unwrap(), prompts::CTA_TEMPLATE);
        for style in [
            HeadlineStyle::Professional,
            HeadlineStyle::Creative,
            HeadlineStyle::News,
            HeadlineStyle::Social,
        ] {
            let t = template_for(TaskKind::Headlines, Some(Variant::Headline(style))).unwrap();
            assert_eq!(t, prompts::HEADLINE_TEMPLATE);
        }
    }

    #[test]
    fn test_unknown_pair_is_configuration_error() {
        let err = template_for(
            TaskKind::Summarization,
            Some(Variant::Hashtag(HashtagPlatform::Twitter)),
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::Configuration(_)));

        assert!(matches!(
            template_for(TaskKind::SocialPosts, None),
            Err(GenerationError::Configuration(_))
        ));
    }

    #[test]
    fn test_every_social_pair_has_guidelines() {
        for format in [
            SocialFormat::Professional,
            SocialFormat::Howto,
            SocialFormat::Comparison,
            SocialFormat::Stepbystep,
        ] {
            for platform in [
                SocialPlatform::Linkedin,
                SocialPlatform::Twitter,
                SocialPlatform::Facebook,
            ] {
                let variant = Some(Variant::Social(format, platform));
                assert!(template_for(TaskKind::SocialPosts, variant).is_ok());
                let text = fragment(variant, "guidelines").unwrap();
                assert!(text.starts_with("- "));
            }
        }
    }

    #[test]
    fn test_hashtag_guidance_defaults_to_general() {
        assert_eq!(
            fragment(None, "platform_guidance"),
            Some(hashtag_guidance(HashtagPlatform::General))
        );
        assert_eq!(fragment(None, "guidelines"), None);
    }
}
