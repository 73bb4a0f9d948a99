use rand::{seq::SliceRandom, Rng};

/// A cell position. `x` grows to the right, `y` grows upward, so row 0 is the bottom row.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Coord {
        Coord { x, y }
    }

    pub fn step(&self, direction: Direction) -> Coord {
        let (dx, dy) = direction.delta();
        Coord::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Scan order used by the declaration-order policies.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Clockwise starting from the left.
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    pub fn opposite(&self) -> Direction {
        match *self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn delta(&self) -> (i32, i32) {
        match *self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn bit(&self) -> u8 {
        match *self {
            Direction::Up => 0b0001,
            Direction::Down => 0b0010,
            Direction::Left => 0b0100,
            Direction::Right => 0b1000,
        }
    }
}

/// A maze cell: its coordinate plus which of its four sides are open.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Cell {
    coord: Coord,
    openings: u8,
}

impl Cell {
    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn x(&self) -> i32 {
        self.coord.x
    }

    pub fn y(&self) -> i32 {
        self.coord.y
    }

    pub fn can_go(&self, direction: Direction) -> bool {
        self.openings & direction.bit() != 0
    }

    pub fn can_go_up(&self) -> bool {
        self.can_go(Direction::Up)
    }

    pub fn can_go_down(&self) -> bool {
        self.can_go(Direction::Down)
    }

    pub fn can_go_left(&self) -> bool {
        self.can_go(Direction::Left)
    }

    pub fn can_go_right(&self) -> bool {
        self.can_go(Direction::Right)
    }

    /// Coordinate of the neighbour in `direction`, if that side is open.
    pub fn neighbor(&self, direction: Direction) -> Option<Coord> {
        self.can_go(direction).then(|| self.coord.step(direction))
    }

    pub fn up(&self) -> Option<Coord> {
        self.neighbor(Direction::Up)
    }

    pub fn down(&self) -> Option<Coord> {
        self.neighbor(Direction::Down)
    }

    pub fn left(&self) -> Option<Coord> {
        self.neighbor(Direction::Left)
    }

    pub fn right(&self) -> Option<Coord> {
        self.neighbor(Direction::Right)
    }
}

/// Fixed-size rectangular grid of cells. Walls on the outer border are never opened.
#[derive(Clone, Debug)]
pub struct Maze {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Maze {
    /// A maze with every wall in place.
    pub fn sealed(width: i32, height: i32) -> Maze {
        let width = width.max(1);
        let height = height.max(1);
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell {
                    coord: Coord::new(x, y),
                    openings: 0,
                });
            }
        }
        Maze {
            width,
            height,
            cells,
        }
    }

    /// A maze with no interior walls.
    pub fn open(width: i32, height: i32) -> Maze {
        let mut maze = Maze::sealed(width, height);
        for y in 0..maze.height {
            for x in 0..maze.width {
                maze.carve(Coord::new(x, y), Direction::Right);
                maze.carve(Coord::new(x, y), Direction::Up);
            }
        }
        maze
    }

    /// A perfect maze carved by randomised depth-first search from the origin.
    pub fn generate<R: Rng + ?Sized>(width: i32, height: i32, rng: &mut R) -> Maze {
        let mut maze = Maze::sealed(width, height);
        let mut visited = vec![false; maze.cells.len()];
        let mut stack = vec![Coord::ORIGIN];
        visited[0] = true;

        while let Some(&current) = stack.last() {
            let mut options: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|d| {
                    maze.index(current.step(*d))
                        .map(|i| !visited[i])
                        .unwrap_or(false)
                })
                .collect();
            options.shuffle(rng);

            match options.first() {
                Some(&direction) => {
                    let next = current.step(direction);
                    maze.carve(current, direction);
                    if let Some(i) = maze.index(next) {
                        visited[i] = true;
                    }
                    stack.push(next);
                }
                None => {
                    stack.pop();
                }
            }
        }
        maze
    }

    /// Opens the passage between `coord` and its neighbour in `direction`.
    /// Returns false when either side lies outside the maze.
    pub fn carve(&mut self, coord: Coord, direction: Direction) -> bool {
        let next = coord.step(direction);
        match (self.index(coord), self.index(next)) {
            (Some(a), Some(b)) => {
                self.cells[a].openings |= direction.bit();
                self.cells[b].openings |= direction.opposite().bit();
                true
            }
            _ => false,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.index(coord).is_some()
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn random_coord<R: Rng + ?Sized>(&self, rng: &mut R) -> Coord {
        Coord::new(rng.gen_range(0..self.width), rng.gen_range(0..self.height))
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        let inside = (0..self.width).contains(&coord.x) && (0..self.height).contains(&coord.y);
        inside.then(|| (coord.y * self.width + coord.x) as usize)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn reachable(maze: &Maze, from: Coord) -> HashSet<Coord> {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(coord) = queue.pop_front() {
            let cell = maze.cell(coord).unwrap();
            for d in Direction::ALL {
                if let Some(next) = cell.neighbor(d) {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        seen
    }

    #[test]
    fn test_direction() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_eq!(Coord::new(3, 3).step(d).step(d.opposite()), Coord::new(3, 3));
        }
        assert_eq!(Coord::ORIGIN.step(Direction::Up), Coord::new(0, 1));
        assert_eq!(Coord::ORIGIN.step(Direction::Left), Coord::new(-1, 0));
    }

    #[test]
    fn test_carve() {
        let mut maze = Maze::sealed(3, 2);
        assert!(!maze.cell(Coord::ORIGIN).unwrap().can_go_right());

        assert!(maze.carve(Coord::ORIGIN, Direction::Right));
        assert_eq!(maze.cell(Coord::ORIGIN).unwrap().right(), Some(Coord::new(1, 0)));
        assert!(maze.cell(Coord::new(1, 0)).unwrap().can_go_left());

        assert!(!maze.carve(Coord::ORIGIN, Direction::Down));
        assert!(!maze.cell(Coord::ORIGIN).unwrap().can_go_down());
    }

    #[test]
    fn test_open_maze_border() {
        let maze = Maze::open(4, 3);
        assert_eq!(maze.len(), 12);
        let corner = maze.cell(Coord::new(3, 2)).unwrap();
        assert!(!corner.can_go_up());
        assert!(!corner.can_go_right());
        assert!(corner.can_go_left());
        assert!(corner.can_go_down());
        assert!(maze.cell(Coord::new(4, 0)).is_none());
        assert!(maze.cell(Coord::new(0, -1)).is_none());
    }

    #[test]
    fn test_generated_maze_is_connected() {
        let mut rng = StdRng::seed_from_u64(7);
        let maze = Maze::generate(12, 9, &mut rng);
        assert_eq!(reachable(&maze, Coord::ORIGIN).len(), maze.len());

        // A perfect maze on n cells has exactly n - 1 passages.
        let passages: usize = maze
            .cells()
            .map(|c| c.can_go_right() as usize + c.can_go_up() as usize)
            .sum();
        assert_eq!(passages, maze.len() - 1);
    }

    #[test]
    fn test_random_coord_in_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let maze = Maze::open(5, 2);
        for _ in 0..200 {
            assert!(maze.contains(maze.random_coord(&mut rng)));
        }
    }
}
