//! Prompt composition for copy requests
//!
//! The core pipeline treats prompts as opaque; this builder is the
//! reference implementation of the composing collaborator, used by the CLI
//! driver. It fixes the output contract the scorer expects: a two-sentence
//! lead followed by exactly three "・" bullets.

use crate::models::{NormalizedInput, PromptBundle};

const TEMPLATE_KEY: &str = "lead2_bullets3_v1";

/// Compose the system/user prompt pair for one request.
pub fn compose_prompts(input: &NormalizedInput) -> PromptBundle {
    let cta_mode = if input.cta_preference.is_empty() {
        "none"
    } else {
        "preferred"
    };

    PromptBundle {
        system: system_prompt(input),
        user: user_prompt(input),
        template_key: TEMPLATE_KEY.to_string(),
        cta_mode: cta_mode.to_string(),
    }
}

fn system_prompt(input: &NormalizedInput) -> String {
    let mut prompt = String::from(
        "あなたは日本語のECコピーライターです。誇張や断定を避け、入力された事実だけを使って\
         商品説明文を書いてください。出力形式: リード文2文、その後に「・」で始まる箇条書きを\
         ちょうど3行。見出しや記号装飾は使わないでください。",
    );
    if let Some(voice) = &input.brand_voice {
        prompt.push_str(&format!("ブランドボイス: {voice}。"));
    }
    if let Some(tone) = &input.tone {
        prompt.push_str(&format!("トーン: {tone}。"));
    }
    if let Some(platform) = &input.platform {
        prompt.push_str(&format!("掲載先: {platform}。"));
    }
    prompt
}

fn user_prompt(input: &NormalizedInput) -> String {
    let mut lines = vec![
        format!("商品名: {}", input.product_name),
        format!("カテゴリ: {}", input.category),
        format!("目的: {}", input.goal),
        format!("ターゲット: {}", input.audience),
    ];
    push_list(&mut lines, "訴求ポイント", &input.selling_points);
    push_list(&mut lines, "根拠", &input.evidence);
    push_list(&mut lines, "キーワード", &input.keywords);
    push_list(&mut lines, "制約", &input.constraints);
    push_list(&mut lines, "想定される不安", &input.objections);
    push_list(&mut lines, "CTAの希望", &input.cta_preference);
    if let Some(hint) = &input.length_hint {
        lines.push(format!("長さの目安: {hint}"));
    }
    lines.push("ターゲットの文言は本文にそのまま入れてください。".to_string());
    lines.join("\n")
}

fn push_list(lines: &mut Vec<String>, label: &str, values: &[String]) {
    if !values.is_empty() {
        lines.push(format!("{label}: {}", values.join(" / ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NormalizedInput {
        NormalizedInput {
            product_name: "Acmeタンブラー".to_string(),
            category: "ドリンクウェア".to_string(),
            goal: "デスクで飲み物を保温する".to_string(),
            audience: "オフィスワーカー".to_string(),
            selling_points: vec!["保温6時間".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_compose_includes_required_fields() {
        let bundle = compose_prompts(&request());
        assert!(bundle.user.contains("Acmeタンブラー"));
        assert!(bundle.user.contains("オフィスワーカー"));
        assert!(bundle.user.contains("保温6時間"));
        assert_eq!(bundle.template_key, TEMPLATE_KEY);
        assert_eq!(bundle.cta_mode, "none");
    }

    #[test]
    fn test_cta_mode_reflects_preference() {
        let mut input = request();
        input.cta_preference.push("今すぐ購入".to_string());
        let bundle = compose_prompts(&input);
        assert_eq!(bundle.cta_mode, "preferred");
    }
}
