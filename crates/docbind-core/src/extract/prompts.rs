//! Instructions sent to the models.

use crate::models::template::Field;

/// Appended to a per-field instruction when several values are expected.
pub const MULTI_VALUE_SUFFIX: &str = "\n注意：此字段可能有多个值，请提取所有匹配的值，并返回数组格式。";

/// Appended to a per-field instruction when one value is expected.
pub const SINGLE_VALUE_SUFFIX: &str = "\n如果文档中有多个疑似匹配的值，请全部列出，并标注最可能的值。";

/// Marker on a field line in the binding instruction.
const MULTI_VALUE_MARKER: &str = "（可能有多值，请全部提取，用英文逗号分隔）";

/// The field's own hint, or a generic "extract this field" instruction.
pub fn field_prompt(field: &Field) -> String {
    match field.prompt() {
        Some(prompt) => prompt.to_string(),
        None => format!("提取\"{}\"字段的值", field.name),
    }
}

/// Per-field model instruction. Documents without an image carry their
/// normalized text inline.
pub fn ai_field_prompt(field: &Field, document_text: Option<&str>) -> String {
    let mut prompt = field_prompt(field);
    prompt.push_str(if field.accepts_multiple() {
        MULTI_VALUE_SUFFIX
    } else {
        SINGLE_VALUE_SUFFIX
    });
    if let Some(text) = document_text {
        prompt.push_str("\n\n文档内容：\n");
        prompt.push_str(text);
    }
    prompt
}

/// One line per field: name, type, optional multi-value marker and hint.
fn describe_fields(fields: &[&Field]) -> String {
    fields
        .iter()
        .map(|field| {
            let mut line = format!("- \"{}\": {}", field.name, field.kind.description());
            if field.accepts_multiple() {
                line.push_str(MULTI_VALUE_MARKER);
            }
            if let Some(prompt) = field.prompt() {
                line.push_str("\n  提取说明：");
                line.push_str(prompt);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Batch binding instruction covering every field at once.
pub fn binding_prompt(fields: &[&Field], content: &str) -> String {
    format!(
        r#"你是一个文档解析助手。请从以下解析结果中提取并匹配模板字段的值。

模板字段列表：
{fields}

解析结果：
{content}

要求：
1. 仔细分析解析结果，准确匹配每个字段的值
2. 如果某个字段在解析结果中找不到，该字段值为空字符串
3. 如果字段允许多值（标注了"可能有多值"），请提取所有匹配的值，用英文逗号分隔
4. 只返回准确的、确定的值，不要猜测
5. 输出格式必须是纯JSON对象，字段名使用模板中的字段名

请直接返回JSON，格式如下：
{{
  "字段名1": "值1",
  "字段名2": "值2,值3",
  "字段名3": ""
}}"#,
        fields = describe_fields(fields),
        content = content,
    )
}
