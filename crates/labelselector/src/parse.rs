use crate::{Operator, Requirement, Result, Selector};

peg::parser! {
    grammar parser() for str {
        rule _() = [' ' | '\t']*
        rule __() = [' ' | '\t']+

        rule key() -> &'input str
            = $(['a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '/']+)
        rule value() -> &'input str
            = $(['a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.']*)
        rule values() -> Vec<&'input str>
            = "(" _ values:(value() ** (_ "," _)) _ ")" { values }

        rule requirement() -> (&'input str, Operator, Vec<&'input str>)
            = "!" _ key:key() { (key, Operator::DoesNotExist, vec![]) }
            / key:key() __ "notin" _ values:values() { (key, Operator::NotIn, values) }
            / key:key() __ "in" _ values:values() { (key, Operator::In, values) }
            / key:key() _ "!=" _ value:value() { (key, Operator::NotEquals, vec![value]) }
            / key:key() _ "==" _ value:value() { (key, Operator::Equals, vec![value]) }
            / key:key() _ "=" _ value:value() { (key, Operator::Equals, vec![value]) }
            / key:key() { (key, Operator::Exists, vec![]) }

        pub rule selector() -> Vec<(&'input str, Operator, Vec<&'input str>)>
            = _ requirements:(requirement() ** (_ "," _)) _ { requirements }
    }
}

/// Parse selector in the string form accepted by the kubernetes API
pub fn parse(input: &str) -> Result<Selector> {
    let mut out = Selector::new();
    for (key, operator, values) in parser::selector(input)? {
        out.push(Requirement::new(key, operator, values)?);
    }
    Ok(out)
}
