//! Fixed prompt texts sent to the model

use aurora_common::MAX_EXCLUDED_URLS;

pub const CONNECTION_TEST: &str = "hi";

pub fn analyze_url(url: &str) -> String {
    format!(
        r##"Analyze this URL: "{url}".
Return a JSON object in Simplified Chinese.
Requirements:
1. "title": Concise name.
2. "description": 10-15 word summary.
3. "brandColor": Hex code.
4. "pros": A short phrase (4-8 chars) highlighting the best feature (e.g. "完全免费开源", "功能极其强大").
5. "cons": A short phrase (4-8 chars) highlighting a limitation (e.g. "国内访问较慢", "需注册使用").

JSON Format:
{{ "title": "", "description": "", "brandColor": "#hex", "pros": "", "cons": "" }}"##
    )
}

pub fn generate_links(category_title: &str, count: usize, existing_urls: &[String]) -> String {
    let excluded = existing_urls
        .iter()
        .take(MAX_EXCLUDED_URLS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r##"List {count} BEST, HIGH-QUALITY websites for the category "{category_title}".
Output a JSON Array in Simplified Chinese.
Requirements:
1. "pros": Short phrase (4-8 chars) e.g. "拥有海量资源".
2. "cons": Short phrase (4-8 chars) e.g. "部分功能收费".
3. Exclude these URLs: {excluded}

JSON Format:
[{{ "title": "", "url": "https://...", "description": "", "color": "#hex", "pros": "", "cons": "" }}]"##
    )
}

pub const GREETING: &str = r#"Generate ONE short, scenic, or philosophical sentence in Simplified Chinese.
Constraints:
1. STRICTLY SIMPLIFIED CHINESE ONLY. NO ENGLISH.
2. Max 15 characters.
3. No lists, no options.
4. Example: "星河滚烫，你是人间理想。""#;

pub fn suggest_icon(text: &str) -> String {
    format!(
        r#"Suggest the BEST SINGLE Lucide React icon name for "{text}".
Examples: "Video" -> "Play", "Code" -> "Code2", "Design" -> "Palette", "Game" -> "Gamepad2".
Output STRICTLY ONLY the icon string name. No quotes."#
    )
}
