#[cfg(test)]
mod program_tests {
    use mython::context::{DummyContext, SimpleContext};
    use mython::environment::Closure;
    use mython::error::{MythonError, Result};
    use mython::interpreter::Interpreter;
    use mython::value::ObjectHolder;

    /// Run `source` end to end, returning everything it printed together
    /// with the program's result.
    fn execute(source: &str) -> (String, Result<ObjectHolder>) {
        let mut context = SimpleContext::new(Vec::new());
        let result = Interpreter::new().run_source(source, &mut context);
        let output = String::from_utf8(context.into_inner()).expect("utf-8 output");

        (output, result)
    }

    fn run(source: &str) -> String {
        let (output, result) = execute(source);

        if let Err(e) = result {
            panic!("program failed: {}\noutput so far:\n{}", e, output);
        }

        output
    }

    #[test]
    fn test_simple_prints() {
        let source = r#"print 57
print 10, 24, -8
print 'hello'
print "world"
print True, False
print
print None
"#;

        assert_eq!(run(source), "57\n10 24 -8\nhello\nworld\nTrue False\n\nNone\n");
    }

    #[test]
    fn test_assignments() {
        let source = r"x = 57
print x
x = 'C++ black belt'
print x
y = False
x = y
print x
x = None
print x, y
";

        assert_eq!(run(source), "57\nC++ black belt\nFalse\nNone False\n");
    }

    #[test]
    fn test_arithmetic() {
        let source = "print 1+2+3+4+5, 1*2*3*4*5, 1-2-3-4-5, 36/4/3, 2*5+10/2\n";

        assert_eq!(run(source), "15 120 -13 3 15\n");
    }

    #[test]
    fn test_variables_are_pointers() {
        let source = r"class Counter:
  def __init__():
    self.value = 0

  def add():
    self.value = self.value + 1

class Dummy:
  def do_add(counter):
    counter.add()

x = Counter()
y = x

x.add()
y.add()

print x.value

d = Dummy()
d.do_add(x)

print y.value
";

        assert_eq!(run(source), "2\n3\n");
    }

    #[test]
    fn test_self_passed_from_constructor() {
        let source = r"class X:
  def __init__(p):
    p.x = self

class XHolder:
  def __init__():
    dummy = 0

xh = XHolder()
x = X(xh)
";

        let mut interpreter = Interpreter::new();
        interpreter
            .run_source(source, &mut DummyContext::new())
            .unwrap();

        let globals = interpreter.globals();
        let x = globals.lookup("x").unwrap();
        let xh = globals.lookup("xh").unwrap();
        let stored = xh.as_instance().unwrap().fields().get("x").unwrap();

        assert!(stored.ptr_eq(&x));
    }

    #[test]
    fn test_rebinding_does_not_affect_aliases() {
        assert_eq!(run("x = 1\ny = x\nx = 2\nprint x, y\n"), "2 1\n");
    }

    #[test]
    fn test_return_inside_if() {
        let source = r"class Sign:
  def of(n):
    if n < 0:
      return 'negative'
    return 'not negative'

  def check(n):
    if n < 0:
      return 'negative'
    else:
      return 'non-negative'

s = Sign()
print s.of(-1)
print s.of(5)
print s.check(0)
";

        assert_eq!(run(source), "negative\nnot negative\nnon-negative\n");
    }

    #[test]
    fn test_special_methods() {
        let source = r"class Point:
  def __init__(x, y):
    self.x = x
    self.y = y

  def __str__():
    return '(' + str(self.x) + ', ' + str(self.y) + ')'

  def __add__(other):
    return Point(self.x + other.x, self.y + other.y)

  def __eq__(other):
    return self.x == other.x and self.y == other.y

  def __lt__(other):
    return self.x < other.x or self.x == other.x and self.y < other.y

a = Point(1, 2)
b = Point(3, 4)
print a + b
print a == a, a == b, a < b, b < a, a <= b, a > b
";

        assert_eq!(run(source), "(4, 6)\nTrue False True False True False\n");
    }

    #[test]
    fn test_inheritance() {
        let source = r"class Animal:
  def __init__(name):
    self.name = name

  def speak():
    return self.name + ' makes a sound'

  def __str__():
    return 'I am ' + self.name

class Dog(Animal):
  def speak():
    return self.name + ' barks'

d = Dog('Rex')
c = Animal('Cat')
print d.speak()
print d
print c.speak()
";

        assert_eq!(run(source), "Rex barks\nI am Rex\nCat makes a sound\n");
    }

    #[test]
    fn test_class_name_can_be_rebound() {
        let source = r"class A:
  def f():
    return 1

print A
A = 5
print A
";

        assert_eq!(run(source), "Class A\n5\n");
    }

    #[test]
    fn test_missing_method_yields_none() {
        let source = r"class A:
  def f(x):
    return x

a = A()
print a.f()
";

        assert_eq!(run(source), "None\n");
    }

    #[test]
    fn test_field_chains() {
        let source = r"class Node:
  def __init__(v):
    self.v = v
    self.next = None

a = Node(1)
a.next = Node(2)
a.next.v = 3
print a.next.v, a.v
";

        assert_eq!(run(source), "3 1\n");
    }

    #[test]
    fn test_recursion() {
        let source = r"class Math:
  def fact(n):
    if n <= 1:
      return 1
    return n * self.fact(n - 1)

m = Math()
print m.fact(5)
";

        assert_eq!(run(source), "120\n");
    }

    #[test]
    fn test_call_statement_result_does_not_end_block() {
        let source = r"class A:
  def f():
    return 1

  def g():
    self.f()
    print 'after'
    return 2

a = A()
print a.g()
";

        assert_eq!(run(source), "after\n2\n");
    }

    #[test]
    fn test_caller_supplied_globals() {
        let mut globals = Closure::new();
        globals.define("base", ObjectHolder::number(40));

        let mut interpreter = Interpreter::with_globals(globals);
        let mut context = SimpleContext::new(Vec::new());
        interpreter
            .run_source("total = base + 2\nprint total\n", &mut context)
            .unwrap();

        assert_eq!(String::from_utf8(context.into_inner()).unwrap(), "42\n");
        assert_eq!(interpreter.globals().lookup("total").unwrap().as_number(), Some(42));
        assert_eq!(interpreter.globals().len(), 2);
    }

    #[test]
    fn test_str_requires_a_rendering_context() {
        let mut interpreter = Interpreter::new();
        let result = interpreter.run_source("s = str(5)\n", &mut DummyContext::new());

        assert!(matches!(result, Err(MythonError::Io(_))));
        assert!(!interpreter.globals().contains("s"));
    }

    #[test]
    fn test_top_level_return_ends_program() {
        let (output, result) = execute("x = 1\nreturn x + 1\nprint x\n");

        assert_eq!(result.unwrap().as_number(), Some(2));
        assert_eq!(output, "");
    }

    #[test]
    fn test_runtime_errors() {
        let (_, result) = execute("if 1:\n  print 1\n");
        assert!(matches!(result, Err(MythonError::Type(_))));

        let (_, result) = execute("print 1/0\n");
        assert!(matches!(result, Err(MythonError::DivisionByZero)));

        let (_, result) = execute("x = 1 + 'a'\n");
        assert!(matches!(result, Err(MythonError::InvalidOperands { .. })));
    }

    #[test]
    fn test_output_before_error_is_kept() {
        let (output, result) = execute("print 1\nprint y\nprint 2\n");

        assert!(matches!(result, Err(MythonError::UndefinedName(name)) if name == "y"));
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_static_errors_run_nothing() {
        let (output, result) = execute("print 1\nprint (2\n");
        assert!(matches!(result, Err(MythonError::Parse { line: 2, .. })));
        assert_eq!(output, "");

        let (output, result) = execute("print 1\nprint 'open\n");
        assert!(matches!(result, Err(MythonError::Lex { line: 2, .. })));
        assert_eq!(output, "");
    }
}
