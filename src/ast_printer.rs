use crate::ast::{LiteralValue, Statement};
use crate::value::Class;

/// Renders a [`Statement`] tree as an s‑expression, one node per pair of
/// parentheses.  Used by the `parse` subcommand.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&self, stmt: &Statement) -> String {
        match stmt {
            Statement::Literal(literal) => match literal {
                LiteralValue::Number(n) => n.to_string(),
                LiteralValue::Str(s) => format!("{:?}", s),
                LiteralValue::Bool(true) => "True".to_string(),
                LiteralValue::Bool(false) => "False".to_string(),
                LiteralValue::None => "None".to_string(),
            },

            Statement::VariableValue(path) => path.join("."),

            Statement::Assignment { name, value } => {
                format!("(= {} {})", name, self.print(value))
            }

            Statement::FieldAssignment {
                object,
                field,
                value,
            } => format!("(= {}.{} {})", self.print(object), field, self.print(value)),

            Statement::Print(args) => self.parenthesize("print", args.iter()),

            Statement::Stringify(arg) => self.parenthesize("str", [&**arg]),

            Statement::Add(lhs, rhs) => self.parenthesize("+", [&**lhs, &**rhs]),
            Statement::Sub(lhs, rhs) => self.parenthesize("-", [&**lhs, &**rhs]),
            Statement::Mult(lhs, rhs) => self.parenthesize("*", [&**lhs, &**rhs]),
            Statement::Div(lhs, rhs) => self.parenthesize("/", [&**lhs, &**rhs]),
            Statement::And(lhs, rhs) => self.parenthesize("and", [&**lhs, &**rhs]),
            Statement::Or(lhs, rhs) => self.parenthesize("or", [&**lhs, &**rhs]),
            Statement::Not(arg) => self.parenthesize("not", [&**arg]),

            Statement::Comparison {
                comparator,
                lhs,
                rhs,
            } => self.parenthesize(comparator.symbol(), [&**lhs, &**rhs]),

            Statement::NewInstance { class, args } => {
                let name = class
                    .upgrade()
                    .map_or_else(|| "<undefined>".to_string(), |c| c.name().to_string());
                self.parenthesize(&format!("new {}", name), args.iter())
            }

            Statement::MethodCall {
                object,
                method,
                args,
            } => self.parenthesize(
                &format!("call {}.{}", self.print(object), method),
                args.iter(),
            ),

            Statement::ClassDefinition(class) => self.print_class(class),

            Statement::IfElse {
                condition,
                if_body,
                else_body,
            } => match else_body {
                Some(else_body) => {
                    self.parenthesize("if", [&**condition, &**if_body, &**else_body])
                }
                None => self.parenthesize("if", [&**condition, &**if_body]),
            },

            Statement::Compound(statements) => self.parenthesize("block", statements.iter()),

            Statement::Return(value) => self.parenthesize("return", [&**value]),
        }
    }

    fn print_class(&self, class: &Class) -> String {
        let mut out = format!("(class {}", class.name());

        if let Some(parent) = class.parent() {
            out.push_str(&format!(" ({})", parent.name()));
        }

        for method in class.methods() {
            out.push_str(&format!(
                " (def {} ({}) {})",
                method.name,
                method.formal_params.join(" "),
                self.print(&method.body)
            ));
        }

        out.push(')');
        out
    }

    fn parenthesize<'s, I>(&self, name: &str, parts: I) -> String
    where
        I: IntoIterator<Item = &'s Statement>,
    {
        let mut out = format!("({}", name);

        for part in parts {
            out.push(' ');
            out.push_str(&self.print(part));
        }

        out.push(')');
        out
    }
}
