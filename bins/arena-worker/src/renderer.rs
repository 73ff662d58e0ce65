/// Driver Template Renderer
///
/// **Core Responsibility:**
/// Merge a language's harness template, the user's code and the problem's
/// signature/test data into one executable source unit. The same grammar
/// renders a language's starter-code stub from the signature alone.
///
/// **Template Grammar:**
/// Harness templates use a fixed set of `{{ name }}` substitution points. There
/// is no general template language, only three blocks:
/// - `{{#each_case}} .. {{/each_case}}` repeats its body once per typed
///   test-case record and is only offered to statically-typed languages
/// - `{{#if_returns}} .. {{/if_returns}}` keeps its body when the signature
///   returns a value
/// - `{{#if_void}} .. {{/if_void}}` keeps its body when it returns `void`
///
/// | Placeholder            | Substitution                                        |
/// |------------------------|-----------------------------------------------------|
/// | `user_code`            | the submitted code, verbatim                        |
/// | `function_name`        | entry point name                                    |
/// | `return_type`          | signature return type, language-neutral             |
/// | `native_return_type`   | return type in the target language's spelling       |
/// | `argument_types`       | native list literal of the argument type names      |
/// | `parameters`           | native parameter list, `arg1..argN`                 |
/// | `test_cases_literal`   | native literal of all cases (JSON for typed langs)  |
/// | `test_cases_json`      | JSON text of all cases                              |
/// | `test_case_count`      | number of cases                                     |
///
/// Inside `each_case`: `case_index`, `case_inputs`, `case_arguments`,
/// `case_declarations`, `case_expected`.
///
/// Templates are scanned in a single pass, so substituted text (user code in
/// particular) is never interpreted as template syntax.

use crate::literal::{Dialect, LiteralEncoder};
use arena_common::types::{DataType, LanguageProfile, ProblemSignature, TestCase, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder `{0}`")]
    UnknownPlaceholder(String),

    #[error("placeholder `{placeholder}` is not available for language `{language}`")]
    Unavailable { placeholder: String, language: String },

    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),

    #[error("`{0}` can only be used inside an each_case block")]
    OutsideCaseBlock(String),

    #[error("{0} blocks cannot be nested")]
    NestedBlock(String),

    #[error("unbalanced template block")]
    UnbalancedBlock,

    #[error("`{0}` cannot be used in a boilerplate template")]
    NotInBoilerplate(String),

    #[error("failed to serialize test cases: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    UserCode,
    FunctionName,
    ReturnType,
    NativeReturnType,
    ArgumentTypes,
    Parameters,
    TestCasesLiteral,
    TestCasesJson,
    TestCaseCount,
    CaseIndex,
    CaseInputs,
    CaseArguments,
    CaseDeclarations,
    CaseExpected,
}

impl Slot {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "user_code" => Slot::UserCode,
            "function_name" => Slot::FunctionName,
            "return_type" => Slot::ReturnType,
            "native_return_type" => Slot::NativeReturnType,
            "argument_types" => Slot::ArgumentTypes,
            "parameters" => Slot::Parameters,
            "test_cases_literal" => Slot::TestCasesLiteral,
            "test_cases_json" => Slot::TestCasesJson,
            "test_case_count" => Slot::TestCaseCount,
            "case_index" => Slot::CaseIndex,
            "case_inputs" => Slot::CaseInputs,
            "case_arguments" => Slot::CaseArguments,
            "case_declarations" => Slot::CaseDeclarations,
            "case_expected" => Slot::CaseExpected,
            _ => return None,
        })
    }

    fn is_case_scoped(&self) -> bool {
        matches!(
            self,
            Slot::CaseIndex
                | Slot::CaseInputs
                | Slot::CaseArguments
                | Slot::CaseDeclarations
                | Slot::CaseExpected
        )
    }

    /// Slots that only need the signature
    fn is_signature_only(&self) -> bool {
        matches!(
            self,
            Slot::FunctionName
                | Slot::ReturnType
                | Slot::NativeReturnType
                | Slot::ArgumentTypes
                | Slot::Parameters
        )
    }

    fn name(&self) -> &'static str {
        match self {
            Slot::UserCode => "user_code",
            Slot::FunctionName => "function_name",
            Slot::ReturnType => "return_type",
            Slot::NativeReturnType => "native_return_type",
            Slot::ArgumentTypes => "argument_types",
            Slot::Parameters => "parameters",
            Slot::TestCasesLiteral => "test_cases_literal",
            Slot::TestCasesJson => "test_cases_json",
            Slot::TestCaseCount => "test_case_count",
            Slot::CaseIndex => "case_index",
            Slot::CaseInputs => "case_inputs",
            Slot::CaseArguments => "case_arguments",
            Slot::CaseDeclarations => "case_declarations",
            Slot::CaseExpected => "case_expected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    EachCase,
    IfReturns,
    IfVoid,
}

impl Block {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "each_case" => Some(Block::EachCase),
            "if_returns" => Some(Block::IfReturns),
            "if_void" => Some(Block::IfVoid),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Block::EachCase => "each_case",
            Block::IfReturns => "if_returns",
            Block::IfVoid => "if_void",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'t> {
    Text(&'t str),
    Slot(Slot),
    Open(Block),
    Close(Block),
}

fn tokenize(template: &str) -> Result<Vec<Token<'_>>, TemplateError> {
    let mut tokens = Vec::new();
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            tokens.push(Token::Text(&rest[..open]));
        }
        let after_open = &rest[open + 2..];
        let close = after_open
            .find("}}")
            .ok_or(TemplateError::Unterminated(offset + open))?;
        let name = after_open[..close].trim();
        let unknown = || TemplateError::UnknownPlaceholder(name.to_string());

        let token = if let Some(block) = name.strip_prefix('#') {
            Token::Open(Block::from_name(block.trim()).ok_or_else(unknown)?)
        } else if let Some(block) = name.strip_prefix('/') {
            Token::Close(Block::from_name(block.trim()).ok_or_else(unknown)?)
        } else {
            Token::Slot(Slot::from_name(name).ok_or_else(unknown)?)
        };
        tokens.push(token);

        let consumed = open + 2 + close + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }

    Ok(tokens)
}

/// Reject templates whose blocks or case placeholders are misplaced, and
/// templates asking for typed records from a language that has none.
fn validate(tokens: &[Token<'_>], dialect: Dialect, language: &str) -> Result<(), TemplateError> {
    let mut open: Vec<Block> = Vec::new();

    for token in tokens {
        match token {
            Token::Open(block) => {
                if *block == Block::EachCase && !dialect.is_typed() {
                    return Err(TemplateError::Unavailable {
                        placeholder: block.name().to_string(),
                        language: language.to_string(),
                    });
                }
                if open.contains(block) {
                    return Err(TemplateError::NestedBlock(block.name().to_string()));
                }
                open.push(*block);
            }
            Token::Close(block) => {
                if open.pop() != Some(*block) {
                    return Err(TemplateError::UnbalancedBlock);
                }
            }
            Token::Slot(slot) if slot.is_case_scoped() && !open.contains(&Block::EachCase) => {
                return Err(TemplateError::OutsideCaseBlock(slot.name().to_string()));
            }
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err(TemplateError::UnbalancedBlock);
    }

    Ok(())
}

/// Boilerplate templates see the signature only: no user code, no cases.
fn validate_boilerplate(tokens: &[Token<'_>]) -> Result<(), TemplateError> {
    for token in tokens {
        match token {
            Token::Slot(slot) if !slot.is_signature_only() => {
                return Err(TemplateError::NotInBoilerplate(slot.name().to_string()));
            }
            Token::Open(Block::EachCase) => {
                return Err(TemplateError::NotInBoilerplate(Block::EachCase.name().to_string()));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Check a boilerplate template without rendering it
pub fn check_boilerplate(template: &str, language: &str) -> Result<(), TemplateError> {
    let tokens = tokenize(template)?;
    validate_boilerplate(&tokens)?;
    validate(&tokens, Dialect::from_slug(language), language)
}

/// One argument of a typed test-case record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedInput {
    pub value: String,
    pub type_name: String,
}

/// Precomputed record for languages that must declare argument types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedCase {
    pub inputs: Vec<TypedInput>,
    pub expected: String,
}

impl TypedCase {
    fn arguments(&self) -> String {
        (0..self.inputs.len())
            .map(|idx| format!("arg{}", idx))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn input_values(&self) -> String {
        self.inputs
            .iter()
            .map(|input| input.value.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn declarations(&self) -> String {
        self.inputs
            .iter()
            .enumerate()
            .map(|(idx, input)| format!("{} arg{} = {};", input.type_name, idx, input.value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Build typed records, taking each argument's declared type from the
/// signature by position. Positions without a type get the dialect's
/// "any" type.
pub fn typed_cases(
    encoder: &LiteralEncoder,
    signature: &ProblemSignature,
    test_cases: &[TestCase],
) -> Vec<TypedCase> {
    let dialect = encoder.dialect();

    test_cases
        .iter()
        .map(|case| TypedCase {
            inputs: case
                .input
                .iter()
                .enumerate()
                .map(|(idx, value)| {
                    let declared = signature.argument_types.get(idx);
                    TypedInput {
                        value: encoder.encode(value, declared),
                        type_name: declared
                            .map(|t| dialect.native_type(t))
                            .unwrap_or_else(|| dialect.any_type().to_string()),
                    }
                })
                .collect(),
            expected: encoder.encode(&case.output, Some(&signature.return_type)),
        })
        .collect()
}

fn encoder_for(profile: &LanguageProfile) -> LiteralEncoder {
    let encoder = LiteralEncoder::new(Dialect::from_slug(&profile.slug));
    match &profile.fallback_element_type {
        Some(element) => encoder.with_fallback_element(element.clone()),
        None => encoder,
    }
}

/// Native literal of the whole collection. Typed languages cannot express a
/// heterogeneous record list natively and get JSON text instead.
fn cases_literal(
    encoder: &LiteralEncoder,
    signature: &ProblemSignature,
    test_cases: &[TestCase],
) -> Result<String, TemplateError> {
    if encoder.dialect().is_typed() {
        return cases_json(test_cases);
    }

    let records: Vec<String> = test_cases
        .iter()
        .map(|case| {
            let inputs: Vec<String> = case
                .input
                .iter()
                .enumerate()
                .map(|(idx, value)| encoder.encode(value, signature.argument_types.get(idx)))
                .collect();
            format!(
                "{{\"input\": [{}], \"output\": {}}}",
                inputs.join(", "),
                encoder.encode(&case.output, Some(&signature.return_type))
            )
        })
        .collect();

    Ok(format!("[{}]", records.join(", ")))
}

fn cases_json(test_cases: &[TestCase]) -> Result<String, TemplateError> {
    serde_json::to_string(test_cases).map_err(|e| TemplateError::Serialization(e.to_string()))
}

struct Substitutions<'a> {
    user_code: &'a str,
    function_name: &'a str,
    return_type: String,
    native_return_type: String,
    argument_types: String,
    parameters: String,
    test_cases_literal: String,
    test_cases_json: String,
    test_case_count: String,
    returns_value: bool,
    records: Vec<TypedCase>,
}

impl<'a> Substitutions<'a> {
    fn new(
        encoder: &LiteralEncoder,
        user_code: &'a str,
        signature: &'a ProblemSignature,
        test_cases: &[TestCase],
    ) -> Result<Self, TemplateError> {
        let dialect = encoder.dialect();
        let type_names = Value::List(
            signature
                .argument_types
                .iter()
                .map(|t| Value::Str(t.to_string()))
                .collect(),
        );

        Ok(Self {
            user_code,
            function_name: &signature.function_name,
            return_type: signature.return_type.to_string(),
            native_return_type: dialect.native_type(&signature.return_type),
            argument_types: encoder.encode(&type_names, Some(&DataType::array_of(DataType::String))),
            parameters: dialect.parameter_list(&signature.argument_types),
            test_cases_literal: cases_literal(encoder, signature, test_cases)?,
            test_cases_json: cases_json(test_cases)?,
            test_case_count: test_cases.len().to_string(),
            returns_value: signature.return_type != DataType::Void,
            records: if dialect.is_typed() {
                typed_cases(encoder, signature, test_cases)
            } else {
                Vec::new()
            },
        })
    }

    fn global(&self, slot: Slot) -> &str {
        match slot {
            Slot::UserCode => self.user_code,
            Slot::FunctionName => self.function_name,
            Slot::ReturnType => &self.return_type,
            Slot::NativeReturnType => &self.native_return_type,
            Slot::ArgumentTypes => &self.argument_types,
            Slot::Parameters => &self.parameters,
            Slot::TestCasesLiteral => &self.test_cases_literal,
            Slot::TestCasesJson => &self.test_cases_json,
            Slot::TestCaseCount => &self.test_case_count,
            // validate() keeps case slots inside blocks
            _ => "",
        }
    }
}

fn write_slot(out: &mut String, slot: Slot, subs: &Substitutions<'_>, case: Option<(usize, &TypedCase)>) {
    match (slot, case) {
        (Slot::CaseIndex, Some((index, _))) => out.push_str(&index.to_string()),
        (Slot::CaseInputs, Some((_, case))) => out.push_str(&case.input_values()),
        (Slot::CaseArguments, Some((_, case))) => out.push_str(&case.arguments()),
        (Slot::CaseDeclarations, Some((_, case))) => out.push_str(&case.declarations()),
        (Slot::CaseExpected, Some((_, case))) => out.push_str(&case.expected),
        (slot, _) => out.push_str(subs.global(slot)),
    }
}

fn write_tokens(
    out: &mut String,
    tokens: &[Token<'_>],
    subs: &Substitutions<'_>,
    case: Option<(usize, &TypedCase)>,
) -> Result<(), TemplateError> {
    let mut idx = 0;
    while idx < tokens.len() {
        match tokens[idx] {
            Token::Text(text) => out.push_str(text),
            Token::Slot(slot) => write_slot(out, slot, subs, case),
            Token::Open(block) => {
                // Same-kind nesting is rejected, so the first matching close ends the block
                let end = tokens[idx + 1..]
                    .iter()
                    .position(|t| *t == Token::Close(block))
                    .map(|offset| idx + 1 + offset)
                    .ok_or(TemplateError::UnbalancedBlock)?;
                let body = &tokens[idx + 1..end];
                match block {
                    Block::EachCase => {
                        for (case_index, record) in subs.records.iter().enumerate() {
                            write_tokens(out, body, subs, Some((case_index, record)))?;
                        }
                    }
                    Block::IfReturns if subs.returns_value => write_tokens(out, body, subs, case)?,
                    Block::IfVoid if !subs.returns_value => write_tokens(out, body, subs, case)?,
                    Block::IfReturns | Block::IfVoid => {}
                }
                idx = end;
            }
            Token::Close(_) => {}
        }
        idx += 1;
    }
    Ok(())
}

/// Render the driver source for one judging run.
///
/// An empty harness returns the user code unchanged. Neither the signature
/// nor the test cases are modified, and the output is a pure function of the
/// inputs.
pub fn render(
    profile: &LanguageProfile,
    user_code: &str,
    signature: &ProblemSignature,
    test_cases: &[TestCase],
) -> Result<String, TemplateError> {
    if profile.harness.is_empty() {
        return Ok(user_code.to_string());
    }

    let encoder = encoder_for(profile);
    let tokens = tokenize(&profile.harness)?;
    validate(&tokens, encoder.dialect(), &profile.slug)?;

    let subs = Substitutions::new(&encoder, user_code, signature, test_cases)?;
    let mut out = String::with_capacity(profile.harness.len() + user_code.len());
    write_tokens(&mut out, &tokens, &subs, None)?;

    Ok(out)
}

/// Render the language's starter-code stub for a signature. A language
/// without a boilerplate template gets an empty stub.
pub fn render_boilerplate(
    profile: &LanguageProfile,
    signature: &ProblemSignature,
) -> Result<String, TemplateError> {
    let encoder = encoder_for(profile);
    let tokens = tokenize(&profile.boilerplate)?;
    validate_boilerplate(&tokens)?;
    validate(&tokens, encoder.dialect(), &profile.slug)?;

    let subs = Substitutions::new(&encoder, "", signature, &[])?;
    let mut out = String::with_capacity(profile.boilerplate.len());
    write_tokens(&mut out, &tokens, &subs, None)?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(slug: &str, harness: &str) -> LanguageProfile {
        LanguageProfile {
            slug: slug.to_string(),
            name: slug.to_string(),
            version: "*".to_string(),
            harness: harness.to_string(),
            boilerplate: String::new(),
            extension: None,
            fallback_element_type: None,
        }
    }

    fn two_sum() -> ProblemSignature {
        serde_json::from_str(
            r#"{
                "function_name": "twoSum",
                "return_type": "int[]",
                "argument_types": ["int[]", "int"],
                "test_cases": [
                    {"input": [[2, 7, 11, 15], 9], "output": [0, 1]},
                    {"input": [[3, 2, 4], 6], "output": [1, 2]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_harness_returns_user_code() {
        let code = "print('hello')\n";
        let signature = two_sum();
        let rendered = render(&profile("python", ""), code, &signature, &signature.test_cases).unwrap();
        assert_eq!(rendered, code);
    }

    #[test]
    fn test_python_substitutions() {
        let signature = two_sum();
        let harness = "{{ user_code }}\ncases = {{test_cases_literal}}\nfn = '{{ function_name }}' # {{ return_type }} {{ argument_types }}";
        let rendered = render(&profile("python", harness), "class Solution: pass", &signature, &signature.test_cases).unwrap();

        assert_eq!(
            rendered,
            "class Solution: pass\n\
             cases = [{\"input\": [[2, 7, 11, 15], 9], \"output\": [0, 1]}, {\"input\": [[3, 2, 4], 6], \"output\": [1, 2]}]\n\
             fn = 'twoSum' # int[] [\"int[]\", \"int\"]"
        );
    }

    #[test]
    fn test_python_boolean_spelling() {
        let signature: ProblemSignature = serde_json::from_str(
            r#"{"function_name": "f", "return_type": "boolean",
                "test_cases": [{"input": [true, null], "output": false}]}"#,
        )
        .unwrap();
        let rendered = render(&profile("python", "{{ test_cases_literal }}"), "", &signature, &signature.test_cases).unwrap();
        assert_eq!(rendered, r#"[{"input": [True, None], "output": False}]"#);

        let rendered = render(&profile("javascript", "{{ test_cases_literal }}"), "", &signature, &signature.test_cases).unwrap();
        assert_eq!(rendered, r#"[{"input": [true, null], "output": false}]"#);
    }

    #[test]
    fn test_user_code_is_not_rescanned() {
        let signature = two_sum();
        let code = "// {{ function_name }} {{ nonsense }}";
        let rendered = render(&profile("javascript", "{{ user_code }}"), code, &signature, &signature.test_cases).unwrap();
        assert_eq!(rendered, code);
    }

    #[test]
    fn test_java_each_case_block() {
        let signature = two_sum();
        let harness = "{{#each_case}}case {{ case_index }}:\n{{ case_declarations }}\nexpect {{ case_expected }} from {{ function_name }}({{ case_arguments }})\n{{/each_case}}";
        let rendered = render(&profile("java", harness), "", &signature, &signature.test_cases).unwrap();

        assert_eq!(
            rendered,
            "case 0:\n\
             int[] arg0 = new int[] {2, 7, 11, 15};\n\
             int arg1 = 9;\n\
             expect new int[] {0, 1} from twoSum(arg0, arg1)\n\
             case 1:\n\
             int[] arg0 = new int[] {3, 2, 4};\n\
             int arg1 = 6;\n\
             expect new int[] {1, 2} from twoSum(arg0, arg1)\n"
        );
    }

    #[test]
    fn test_cpp_inline_inputs_and_native_types() {
        let signature = two_sum();
        let harness = "{{ native_return_type }} r = s.{{ function_name }}({{#each_case}}{{ case_inputs }}{{/each_case}});";
        let rendered = render(&profile("cpp", harness), "", &signature, &signature.test_cases[..1]).unwrap();
        assert_eq!(rendered, "std::vector<int> r = s.twoSum({2, 7, 11, 15}, 9);");
    }

    #[test]
    fn test_typed_cases_default_missing_types() {
        let signature: ProblemSignature = serde_json::from_str(
            r#"{"function_name": "f", "return_type": "int", "argument_types": ["string"],
                "test_cases": [{"input": ["a", 3], "output": 1}]}"#,
        )
        .unwrap();

        let java = typed_cases(&LiteralEncoder::new(Dialect::Java), &signature, &signature.test_cases);
        assert_eq!(java[0].inputs[0], TypedInput { value: "\"a\"".to_string(), type_name: "String".to_string() });
        assert_eq!(java[0].inputs[1].type_name, "Object");
        assert_eq!(java[0].expected, "1");

        let cpp = typed_cases(&LiteralEncoder::new(Dialect::Cpp), &signature, &signature.test_cases);
        assert_eq!(cpp[0].inputs[0].type_name, "std::string");
        assert_eq!(cpp[0].inputs[1].type_name, "auto");
    }

    #[test]
    fn test_typed_languages_get_json_literal() {
        let signature = two_sum();
        let rendered = render(&profile("java", "{{ test_cases_literal }}|{{ test_case_count }}"), "", &signature, &signature.test_cases[..1]).unwrap();
        assert_eq!(rendered, r#"[{"input":[[2,7,11,15],9],"output":[0,1]}]|1"#);
    }

    #[test]
    fn test_unknown_placeholder_fails() {
        let signature = two_sum();
        let err = render(&profile("python", "{{ user_code }} {{ mystery }}"), "", &signature, &[]).unwrap_err();
        assert_eq!(err, TemplateError::UnknownPlaceholder("mystery".to_string()));
    }

    #[test]
    fn test_each_case_unavailable_for_untyped_language() {
        let signature = two_sum();
        let err = render(&profile("python", "{{#each_case}}{{/each_case}}"), "", &signature, &[]).unwrap_err();
        assert!(matches!(err, TemplateError::Unavailable { ref placeholder, .. } if placeholder == "each_case"));
    }

    #[test]
    fn test_structural_errors() {
        let signature = two_sum();
        let render_java = |harness: &str| render(&profile("java", harness), "", &signature, &[]);

        assert_eq!(render_java("ok {{ user_code"), Err(TemplateError::Unterminated(3)));
        assert_eq!(render_java("{{ case_index }}"), Err(TemplateError::OutsideCaseBlock("case_index".to_string())));
        assert_eq!(render_java("{{#each_case}}{{#each_case}}"), Err(TemplateError::NestedBlock("each_case".to_string())));
        assert_eq!(
            render_java("{{#if_void}}{{#if_returns}}{{/if_void}}{{/if_returns}}"),
            Err(TemplateError::UnbalancedBlock)
        );
        assert_eq!(
            render_java("{{#if_void}}{{#if_void}}{{/if_void}}{{/if_void}}"),
            Err(TemplateError::NestedBlock("if_void".to_string()))
        );
        assert_eq!(render_java("{{/each_case}}"), Err(TemplateError::UnbalancedBlock));
        assert_eq!(render_java("{{#each_case}}"), Err(TemplateError::UnbalancedBlock));
    }

    #[test]
    fn test_unused_placeholders_are_fine() {
        let signature = two_sum();
        let rendered = render(&profile("java", "{{ user_code }}"), "class Solution {}", &signature, &signature.test_cases).unwrap();
        assert_eq!(rendered, "class Solution {}");
    }

    #[test]
    fn test_render_is_deterministic_and_read_only() {
        let signature = two_sum();
        let before = signature.clone();
        let harness = "{{ user_code }}{{#each_case}}{{ case_declarations }}{{/each_case}}{{ test_cases_json }}";
        let first = render(&profile("java", harness), "x", &signature, &signature.test_cases).unwrap();
        let second = render(&profile("java", harness), "x", &signature, &signature.test_cases).unwrap();
        assert_eq!(first, second);
        assert_eq!(signature, before);
    }

    #[test]
    fn test_profile_fallback_element_type() {
        let signature: ProblemSignature = serde_json::from_str(
            r#"{"function_name": "f", "test_cases": [{"input": [["a", "b"]], "output": null}]}"#,
        )
        .unwrap();
        let mut java = profile("java", "{{#each_case}}{{ case_inputs }}{{/each_case}}");
        java.fallback_element_type = Some(DataType::String);
        let rendered = render(&java, "", &signature, &signature.test_cases).unwrap();
        assert_eq!(rendered, r#"new String[] {"a", "b"}"#);
    }

    fn sort_in_place() -> ProblemSignature {
        serde_json::from_str(
            r#"{
                "function_name": "sortInPlace",
                "return_type": "void",
                "argument_types": ["int[]"],
                "test_cases": [{"input": [[3, 1, 2]], "output": null}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_return_blocks_follow_signature() {
        let harness = "{{#each_case}}{{#if_void}}s.{{ function_name }}({{ case_arguments }});{{/if_void}}{{#if_returns}}{{ native_return_type }} r = s.{{ function_name }}({{ case_arguments }});{{/if_returns}}{{/each_case}}";

        let void = sort_in_place();
        let rendered = render(&profile("java", harness), "", &void, &void.test_cases).unwrap();
        assert_eq!(rendered, "s.sortInPlace(arg0);");

        let returning = two_sum();
        let rendered = render(&profile("java", harness), "", &returning, &returning.test_cases[..1]).unwrap();
        assert_eq!(rendered, "int[] r = s.twoSum(arg0, arg1);");
    }

    #[test]
    fn test_return_blocks_work_for_untyped_languages() {
        let harness = "{{#if_returns}}print(result){{/if_returns}}{{#if_void}}print(args){{/if_void}}";
        let void = sort_in_place();
        assert_eq!(render(&profile("python", harness), "", &void, &[]).unwrap(), "print(args)");
        assert_eq!(render(&profile("python", harness), "", &two_sum(), &[]).unwrap(), "print(result)");
    }

    #[test]
    fn test_whitespace_harness_is_still_a_template() {
        let signature = two_sum();
        let rendered = render(&profile("python", "  \n"), "print(1)", &signature, &signature.test_cases).unwrap();
        assert_eq!(rendered, "  \n");
    }

    fn with_boilerplate(slug: &str, boilerplate: &str) -> LanguageProfile {
        let mut profile = profile(slug, "");
        profile.boilerplate = boilerplate.to_string();
        profile
    }

    #[test]
    fn test_boilerplate_per_language() {
        let signature = two_sum();

        let python = with_boilerplate("python", "class Solution:\n    def {{ function_name }}({{ parameters }}):\n        pass");
        assert_eq!(
            render_boilerplate(&python, &signature).unwrap(),
            "class Solution:\n    def twoSum(self, arg1, arg2):\n        pass"
        );

        let java = with_boilerplate("java", "public {{ native_return_type }} {{ function_name }}({{ parameters }}) {}");
        assert_eq!(
            render_boilerplate(&java, &signature).unwrap(),
            "public int[] twoSum(int[] arg1, int arg2) {}"
        );

        let cpp = with_boilerplate("cpp", "{{ native_return_type }} {{ function_name }}({{ parameters }})");
        assert_eq!(
            render_boilerplate(&cpp, &signature).unwrap(),
            "std::vector<int> twoSum(std::vector<int> arg1, int arg2)"
        );

        let javascript = with_boilerplate("javascript", "var {{ function_name }} = function({{ parameters }}) {};");
        assert_eq!(
            render_boilerplate(&javascript, &signature).unwrap(),
            "var twoSum = function(arg1, arg2) {};"
        );
    }

    #[test]
    fn test_boilerplate_without_arguments_is_variadic() {
        let signature: ProblemSignature =
            serde_json::from_str(r#"{"function_name": "solve", "return_type": "int"}"#).unwrap();

        let java = with_boilerplate("java", "{{ parameters }}");
        assert_eq!(render_boilerplate(&java, &signature).unwrap(), "Object... args");

        let ruby = with_boilerplate("ruby", "def {{ function_name }}({{ parameters }})");
        assert_eq!(render_boilerplate(&ruby, &signature).unwrap(), "def solve(*args)");
    }

    #[test]
    fn test_boilerplate_rejects_judging_placeholders() {
        let signature = two_sum();
        for (template, name) in [
            ("{{ user_code }}", "user_code"),
            ("{{ test_cases_json }}", "test_cases_json"),
            ("{{#each_case}}{{/each_case}}", "each_case"),
        ] {
            assert_eq!(
                render_boilerplate(&with_boilerplate("java", template), &signature),
                Err(TemplateError::NotInBoilerplate(name.to_string()))
            );
        }
        assert_eq!(check_boilerplate("{{ parameters }}", "python"), Ok(()));
        assert!(check_boilerplate("{{#if_void}}", "python").is_err());
    }

    #[test]
    fn test_missing_boilerplate_renders_empty() {
        assert_eq!(render_boilerplate(&profile("python", ""), &two_sum()).unwrap(), "");
    }
}
