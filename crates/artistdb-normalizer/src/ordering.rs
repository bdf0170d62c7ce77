use std::cmp::Ordering;

/// Orden de las claves del directorio: primero sin distinguir mayúsculas,
/// luego por bytes para que el orden sea total y estable.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
  a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Intercambio que haría falta para ordenar las claves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transposition {
  /// Clave que se coloca en su sitio definitivo.
  pub placed: String,
  /// Clave que ocupaba ese sitio y pasa a estar "en la mano".
  pub displaced: String,
}

/// Simula un cycle sort sobre `keys` y devuelve los intercambios necesarios
/// para dejarlas en orden [`locale_cmp`], en el orden en que ocurrirían.
///
/// Solo informa: no se usa para producir la salida. Cada ciclo de longitud k
/// aporta k - 1 intercambios (el cierre del ciclo no cuenta), así que el total
/// es el mínimo número de transposiciones.
pub fn transpositions(keys: &[&str]) -> Vec<Transposition> {
  let mut arr: Vec<&str> = keys.to_vec();
  let n = arr.len();
  let mut swaps = Vec::new();

  let target = |arr: &[&str], start: usize, item: &str| {
    let mut pos = start + arr[start + 1..].iter().filter(|k| locale_cmp(k, item) == Ordering::Less).count();
    while pos < arr.len() && pos != start && arr[pos] == item {
      pos += 1;
    }
    pos
  };

  for start in 0..n.saturating_sub(1) {
    let mut item = arr[start];
    let mut pos = target(&arr, start, item);

    while pos != start && pos < n {
      std::mem::swap(&mut item, &mut arr[pos]);
      swaps.push(Transposition { placed: arr[pos].to_string(), displaced: item.to_string() });
      pos = target(&arr, start, item);
    }

    // Cierre del ciclo.
    arr[start] = item;
  }

  swaps
}

#[cfg(test)]
mod tests {
  use super::*;

  fn count(keys: &[&str]) -> usize {
    transpositions(keys).len()
  }

  #[test]
  fn comparator_ignores_case_first() {
    assert_eq!(locale_cmp("alice", "Bob"), Ordering::Less);
    assert_eq!(locale_cmp("Bob", "alice"), Ordering::Greater);
    assert_eq!(locale_cmp("Alice", "alice"), Ordering::Less);
    assert_eq!(locale_cmp("alice", "alice"), Ordering::Equal);
  }

  #[test]
  fn sorted_keys_need_no_swaps() {
    assert_eq!(count(&[]), 0);
    assert_eq!(count(&["alice"]), 0);
    assert_eq!(count(&["alice", "Bob", "carol"]), 0);
  }

  #[test]
  fn reversed_keys_report_each_swap() {
    let swaps = transpositions(&["carol", "bob", "alice"]);
    assert_eq!(swaps, vec![Transposition { placed: "carol".into(), displaced: "alice".into() }]);

    assert_eq!(count(&["bob", "alice"]), 1);
    assert_eq!(count(&["d", "c", "b", "a"]), 2);
  }

  #[test]
  fn rotation_needs_cycle_length_minus_one() {
    assert_eq!(count(&["bob", "carol", "alice"]), 2);
    assert_eq!(count(&["b", "c", "d", "e", "a"]), 4);
  }
}
