// Prompt templates for the live recipe generator.
// Templates use {placeholder} markers filled with `.replace` in `build_recipe_prompt`.

use crate::history::ExclusionHints;
use crate::models::recipe::Category;
use crate::validation::BATCH_SIZE;

/// System prompt for recipe generation: JSON only, nothing else.
pub const RECIPE_SYSTEM: &str = "あなたはお弁当レシピの専門家です。\
    必ず有効なJSONのみで回答してください。\
    JSON以外のテキストやマークダウンのコードブロックは含めないでください。";

/// Bento batch prompt.
/// Replace: {count}, {category_name}, {category_description}, {avoid_section}
pub const RECIPE_PROMPT_TEMPLATE: &str = r#"以下の条件で{count}個の異なるお弁当レシピを生成してください。

カテゴリ: {category_name}
説明: {category_description}
{avoid_section}
各レシピには以下を含めてください:
- お弁当の名前（魅力的で具体的なもの）
- 簡潔な説明（1文）
- メインディッシュ（名前、材料リスト、調理手順）
- 副菜1（名前、材料リスト、調理手順）
- 副菜2（名前、材料リスト、調理手順）
- 調理時間（分）
- カロリー（kcal）
- 難易度（簡単/普通/上級）
- 調理のコツ（2-3個）

重要な要件:
1. {count}個すべて異なる献立にし、副菜の名前も重複させないこと
2. 1つのお弁当の中で同じ調理法（煮物・炒め物・和え物など）を繰り返さないこと
3. 料理名に含まれる調味料・香味野菜・ハーブ（例: 生姜焼き → 生姜、ハーブ焼き → ハーブ）は必ず材料リストに入れること
4. 季節の食材を取り入れ、栄養バランスを考慮すること
5. 冷めても美味しく、お弁当箱に詰めやすい料理を選ぶこと
6. お弁当に不向きな食材は使わないこと:
   - 大根おろし（水分が多すぎる）
   - 生野菜サラダ（しおれる）
   - 豆腐（水分が出る）
   - 刺身・生魚（食中毒リスク）
   - マヨネーズベースのサラダ（傷みやすい）
7. 汁気の多い料理は避けること

以下のJSON形式で出力してください:

{
  "recipes": [
    {
      "name": "お弁当の名前",
      "description": "簡潔な説明",
      "mainDish": {"name": "メインディッシュ名", "ingredients": ["材料1", "材料2"], "instructions": ["手順1", "手順2"]},
      "sideDish1": {"name": "副菜1の名前", "ingredients": ["材料1"], "instructions": ["手順1"]},
      "sideDish2": {"name": "副菜2の名前", "ingredients": ["材料1"], "instructions": ["手順1"]},
      "prepTime": 30,
      "calories": 550,
      "difficulty": "簡単",
      "tips": ["コツ1", "コツ2"]
    }
  ]
}"#;

/// Upper bound on names listed per avoid line, to keep prompts a reasonable size.
const MAX_NAMES_PER_LINE: usize = 30;

fn avoid_line(label: &str, values: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let listed: Vec<&str> = values
        .iter()
        .take(MAX_NAMES_PER_LINE)
        .map(String::as_str)
        .collect();
    Some(format!("- {label}: {}", listed.join("、")))
}

fn avoid_section(hints: &ExclusionHints) -> String {
    let lines: Vec<String> = [
        avoid_line("最近のお弁当名", &hints.recipe_names),
        avoid_line("最近のメインディッシュ", &hints.main_dishes),
        avoid_line("最近の副菜", &hints.side_dishes),
        avoid_line("最近の主な食材", &hints.main_ingredients),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut section = String::new();
    if !lines.is_empty() {
        section.push_str("\n重要: 最近作った以下の料理とは異なるものにしてください:\n");
        section.push_str(&lines.join("\n"));
        section.push('\n');
    }
    if !hints.cooking_methods.is_empty() {
        section.push_str(&format!(
            "\n最近よく使った調理法（できるだけ避けてください）: {}\n",
            hints.cooking_methods.join("、")
        ));
    }
    section
}

pub fn build_recipe_prompt(category: Category, hints: &ExclusionHints) -> String {
    RECIPE_PROMPT_TEMPLATE
        .replace("{count}", &BATCH_SIZE.to_string())
        .replace("{category_name}", category.display_name())
        .replace("{category_description}", category.description())
        .replace("{avoid_section}", &avoid_section(hints))
}
