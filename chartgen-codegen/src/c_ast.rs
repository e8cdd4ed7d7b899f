//! Minimal C code model: just enough to print enums, structs, functions and
//! switch statements. It knows nothing about statecharts.

use core::fmt;

use crate::writer::IndentedWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CType {
    Void,
    Enum(String),
    Struct(String),
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Void => f.write_str("void"),
            CType::Enum(name) => write!(f, "enum {name}"),
            CType::Struct(name) => write!(f, "struct {name}"),
        }
    }
}

/// A typed name: function parameter or struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CDecl {
    pub ty: CType,
    pub name: String,
    pub pointer_level: usize,
}

impl CDecl {
    pub fn new(ty: CType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
            pointer_level: 0,
        }
    }

    #[must_use]
    pub fn pointer(mut self) -> Self {
        self.pointer_level += 1;
        self
    }
}

impl fmt::Display for CDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.ty, "*".repeat(self.pointer_level), self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CEnum {
    pub name: String,
    pub members: Vec<String>,
}

impl CEnum {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn ty(&self) -> CType {
        CType::Enum(self.name.clone())
    }
}

impl fmt::Display for CEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = IndentedWriter::new();
        w.append(format!("{} {{", self.ty()));
        w.increase();
        w.append(self.members.join(",\n"));
        w.decrease();
        w.append("};");
        write!(f, "{w}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CStruct {
    pub name: String,
    pub members: Vec<CDecl>,
}

impl CStruct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn ty(&self) -> CType {
        CType::Struct(self.name.clone())
    }
}

impl fmt::Display for CStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = IndentedWriter::new();
        w.append(format!("{} {{", self.ty()));
        w.increase();
        for member in &self.members {
            w.append(format!("{member};"));
        }
        w.decrease();
        w.append("};");
        write!(f, "{w}")
    }
}

/// Block comment; each line is rendered as ` * line`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CComment {
    pub lines: Vec<String>,
}

impl CComment {
    pub fn new(content: impl fmt::Display) -> Self {
        let mut comment = Self::default();
        comment.append(content);
        comment
    }

    pub fn append(&mut self, content: impl fmt::Display) {
        self.lines
            .extend(content.to_string().lines().map(str::to_owned));
    }
}

impl fmt::Display for CComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "/*")?;
        for line in &self.lines {
            writeln!(f, " * {line}")?;
        }
        write!(f, " */")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CStatement {
    /// A raw line, terminator included.
    Line(String),
    Blank,
    Comment(CComment),
    Switch(CSwitch),
}

impl CStatement {
    pub fn line(text: impl Into<String>) -> Self {
        CStatement::Line(text.into())
    }
}

impl fmt::Display for CStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CStatement::Line(text) => f.write_str(text),
            CStatement::Blank => Ok(()),
            CStatement::Comment(comment) => write!(f, "{comment}"),
            CStatement::Switch(switch) => write!(f, "{switch}"),
        }
    }
}

/// `switch` with cases in insertion order and an optional trailing default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSwitch {
    pub discriminant: String,
    pub cases: Vec<(String, Vec<CStatement>)>,
    pub default: Option<Vec<CStatement>>,
}

impl CSwitch {
    pub fn new(discriminant: impl Into<String>) -> Self {
        Self {
            discriminant: discriminant.into(),
            cases: Vec::new(),
            default: None,
        }
    }

    pub fn case(&mut self, label: impl Into<String>, body: Vec<CStatement>) {
        self.cases.push((label.into(), body));
    }
}

impl fmt::Display for CSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = IndentedWriter::new();
        w.append(format!("switch ({}) {{", self.discriminant));
        w.increase();
        let default = self.default.iter().map(|body| ("default:".to_owned(), body));
        let cases = self
            .cases
            .iter()
            .map(|(label, body)| (format!("case {label}:"), body))
            .chain(default);
        for (header, body) in cases {
            w.append(header);
            w.increase();
            for statement in body {
                w.append(statement);
            }
            w.decrease();
        }
        w.decrease();
        w.append("}");
        write!(f, "{w}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFunction {
    pub name: String,
    pub return_type: CType,
    pub params: Vec<CDecl>,
    pub body: Vec<CStatement>,
    pub is_static: bool,
}

impl CFunction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: CType::Void,
            params: Vec::new(),
            body: Vec::new(),
            is_static: false,
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: CDecl) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn make_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let storage = if self.is_static { "static " } else { "" };
        format!("{storage}{} {}({params})", self.return_type, self.name)
    }

    /// Prototype, e.g. `void run(struct ctx *ctx);`.
    #[must_use]
    pub fn declare(&self) -> String {
        format!("{};", self.signature())
    }

    /// Call expression without the trailing `;`.
    #[must_use]
    pub fn call(&self, args: &[&str]) -> String {
        format!("{}({})", self.name, args.join(", "))
    }
}

impl fmt::Display for CFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = IndentedWriter::new();
        w.append(format!("{} {{", self.signature()));
        w.increase();
        for statement in &self.body {
            w.append(statement);
        }
        w.decrease();
        w.append("}");
        write!(f, "{w}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_members_are_comma_separated() {
        let mut e = CEnum::new("door_states");
        e.members.push("DOOR_NO_STATE".into());
        e.members.push("DOOR_OPEN".into());
        assert_eq!(
            e.to_string(),
            "enum door_states {\n    DOOR_NO_STATE,\n    DOOR_OPEN\n};\n"
        );
    }

    #[test]
    fn types_render_as_c_type_names() {
        assert_eq!(CType::Void.to_string(), "void");
        assert_eq!(CType::Enum("door_states".into()).to_string(), "enum door_states");
        assert_eq!(CType::Struct("door_context".into()).to_string(), "struct door_context");
    }

    #[test]
    fn struct_members_are_terminated() {
        let mut s = CStruct::new("door_context");
        s.members
            .push(CDecl::new(CType::Enum("door_states".into()), "active_state"));
        assert_eq!(
            s.to_string(),
            "struct door_context {\n    enum door_states active_state;\n};\n"
        );
    }

    #[test]
    fn function_prototype_and_definition() {
        let param = CDecl::new(CType::Struct("door_context".into()), "ctx").pointer();
        let mut f = CFunction::new("door_eval_Open")
            .with_param(param)
            .make_static();
        assert_eq!(
            f.declare(),
            "static void door_eval_Open(struct door_context *ctx);"
        );
        assert_eq!(f.call(&["ctx"]), "door_eval_Open(ctx)");

        f.body.push(CStatement::Comment(CComment::new("Transition -> Closed")));
        f.body.push(CStatement::Blank);
        f.body.push(CStatement::line("door_eval_Root(ctx);"));
        assert_eq!(
            f.to_string(),
            "static void door_eval_Open(struct door_context *ctx) {\n    /*\n     * Transition -> Closed\n     */\n\n    door_eval_Root(ctx);\n}\n"
        );
    }

    #[test]
    fn switch_renders_cases_then_default() {
        let mut sw = CSwitch::new("ctx->active_state");
        sw.case("A", vec![CStatement::line("a();"), CStatement::line("break;")]);
        sw.default = Some(vec![CStatement::line("break;")]);
        assert_eq!(
            sw.to_string(),
            "switch (ctx->active_state) {\n    case A:\n        a();\n        break;\n    default:\n        break;\n}\n"
        );
    }
}
