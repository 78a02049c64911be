use lispet::Interpreter;

fn eval_expr(interp: &mut Interpreter, expr: &str) -> String {
    match interp.eval_top_level(expr) {
        Ok(value) => value.to_string(),
        Err(e) => format!("Error: {e}"),
    }
}

fn fresh() -> Interpreter {
    Interpreter::new().expect("prelude must load")
}

#[test]
fn test_null_and_not() {
    let mut interp = fresh();
    assert_eq!(eval_expr(&mut interp, "(null nil)"), "t");
    assert_eq!(eval_expr(&mut interp, "(null '())"), "t");
    assert_eq!(eval_expr(&mut interp, "(null '(1))"), "nil");
    assert_eq!(eval_expr(&mut interp, "(not t)"), "nil");
    assert_eq!(eval_expr(&mut interp, "(not nil)"), "t");
}

#[test]
fn test_append() {
    let mut interp = fresh();
    assert_eq!(eval_expr(&mut interp, "(append '(1 2) '(3 4))"), "(1 2 3 4)");
    assert_eq!(eval_expr(&mut interp, "(append nil '(a))"), "(a)");
}

#[test]
fn test_pair_and_assoc() {
    let mut interp = fresh();
    assert_eq!(
        eval_expr(&mut interp, "(pair '(x y z) '(1 2 3))"),
        "((x 1) (y 2) (z 3))"
    );
    assert_eq!(
        eval_expr(&mut interp, "(assoc 'y '((x 1) (y 2) (z 3)))"),
        "2"
    );
}

#[test]
fn test_len() {
    let mut interp = fresh();
    assert_eq!(eval_expr(&mut interp, "(len '(a b c))"), "3");
    assert_eq!(eval_expr(&mut interp, "(len nil)"), "0");
}

#[test]
fn test_flatten() {
    let mut interp = fresh();
    assert_eq!(
        eval_expr(&mut interp, "(flatten '(1 (2 (3 4)) 5))"),
        "(1 2 3 4 5)"
    );
}

#[test]
fn test_equal_is_structural() {
    let mut interp = fresh();
    assert_eq!(eval_expr(&mut interp, "(equal '(1 (2)) '(1 (2)))"), "t");
    assert_eq!(eval_expr(&mut interp, "(equal '(1 2) '(1 3))"), "nil");
    assert_eq!(eval_expr(&mut interp, "(equal 'a 'a)"), "t");
}

#[test]
fn test_member_with_numeric_literals() {
    let mut interp = fresh();
    assert_eq!(eval_expr(&mut interp, "(member 2 '(1 2 3))"), "t");
    assert_eq!(eval_expr(&mut interp, "(member 9 '(1 2 3))"), "nil");
    assert_eq!(eval_expr(&mut interp, "(member 'b '(a b c))"), "t");
}

#[test]
fn test_last() {
    let mut interp = fresh();
    assert_eq!(eval_expr(&mut interp, "(last '(1 2 3))"), "3");
    assert_eq!(eval_expr(&mut interp, "(last nil)"), "nil");
}

#[test]
fn test_reverse() {
    let mut interp = fresh();
    assert_eq!(eval_expr(&mut interp, "(reverse '(1 2 3))"), "(3 2 1)");
    assert_eq!(eval_expr(&mut interp, "(reverse nil)"), "nil");
}

#[test]
fn test_remove() {
    let mut interp = fresh();
    assert_eq!(eval_expr(&mut interp, "(remove 2 '(1 2 3 2))"), "(1 3)");
    assert_eq!(eval_expr(&mut interp, "(remove 'x '(a b))"), "(a b)");
}

#[test]
fn test_mapcar_with_a_quoted_function_name() {
    let mut interp = fresh();
    assert_eq!(
        eval_expr(&mut interp, "(mapcar 'len '((1 2) (3) ()))"),
        "(2 1 0)"
    );
    eval_expr(&mut interp, "(defun double (x) (+ x x))");
    assert_eq!(eval_expr(&mut interp, "(mapcar 'double '(1 2 3))"), "(2 4 6)");
}

#[test]
fn test_maplist_with_a_function_value() {
    let mut interp = fresh();
    assert_eq!(
        eval_expr(&mut interp, "(maplist '(1 2 3) len)"),
        "(3 2 1)"
    );
}

#[test]
fn test_apply() {
    let mut interp = fresh();
    assert_eq!(eval_expr(&mut interp, "(apply '+ '(1 2 3))"), "6");
    assert_eq!(eval_expr(&mut interp, "(apply '+ nil)"), "nil");
}

#[test]
fn test_prelude_definitions_can_be_shadowed() {
    let mut interp = fresh();
    eval_expr(&mut interp, "(defun len (s) 'overridden)");
    assert_eq!(eval_expr(&mut interp, "(len '(1 2))"), "overridden");
    interp.reset().unwrap();
    assert_eq!(eval_expr(&mut interp, "(len '(1 2))"), "2");
}
